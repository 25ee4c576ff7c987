/*!
 * Repository reference parsing
 */

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::ExportError;

// git@host:owner/repo(.git)
static SSH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^git@([^:/\s]+):(.+)$").expect("SSH reference pattern is valid")
});

/// Owner and name of a remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    /// Repository owner/username
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryReference {
    /// Create a reference from already separated parts
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Build a reference from the trailing two segments of a `/`-separated path
    fn from_segments(path: &str, input: &str) -> Result<Self, ExportError> {
        let path = path.trim_end_matches('/');
        let mut segments = path.rsplit('/');

        let name = segments.next().unwrap_or_default();
        let owner = segments.next().unwrap_or_default();

        // Remove .git suffix if present
        let name = name.strip_suffix(".git").unwrap_or(name);

        if owner.is_empty() || name.is_empty() {
            return Err(ExportError::MalformedReference(input.to_string()));
        }

        Ok(Self::new(owner, name))
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryReference {
    type Err = ExportError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();

        if let Some(captures) = SSH_REGEX.captures(trimmed) {
            return Self::from_segments(&captures[2], input);
        }

        // With a scheme only the URL path counts, so a bare host has no segments
        if trimmed.contains("://") {
            let parsed =
                Url::parse(trimmed).map_err(|_| ExportError::MalformedReference(input.to_string()))?;
            return Self::from_segments(parsed.path(), input);
        }

        Self::from_segments(trimmed, input)
    }
}
