//! Global error handling for codeforias
//!
//! This module provides the error type returned by every export stage. Each
//! variant belongs to exactly one [`ExportStage`] so callers can branch on
//! where an export failed instead of matching on message text.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::github::ApiError;

/// Stage of the export pipeline an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExportStage {
    /// Configuration validation and client setup
    Setup,
    /// Parsing the repository URL
    Reference,
    /// Looking the repository up on the remote API
    Resolution,
    /// Walking the remote tree
    Traversal,
    /// Writing the output document
    Write,
}

/// Global error type for export operations
#[derive(Error, Debug)]
pub enum ExportError {
    /// The input does not contain an `owner/repo` pair
    #[error("Malformed repository reference: {0:?}")]
    MalformedReference(String),

    /// The credential was rejected by the remote API
    #[error("Authentication failed for {repository}: {message}")]
    Authentication { repository: String, message: String },

    /// The repository does not exist or is not visible with the given credential
    #[error("Repository not found or inaccessible: {0}")]
    RepositoryNotFound(String),

    /// A network or API failure while looking the repository up
    #[error("Failed to look up repository {repository}: {source}")]
    Resolution {
        repository: String,
        #[source]
        source: ApiError,
    },

    /// A network or API failure while walking the tree
    #[error("Failed to read '{path}' from the repository: {source}")]
    Traversal {
        /// Relative path being listed or fetched ("" for the root)
        path: String,
        #[source]
        source: ApiError,
    },

    /// The output document could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The export was cancelled through its cancel handle
    #[error("Export cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExportError {
    /// Stage of the pipeline this error belongs to
    pub fn stage(&self) -> ExportStage {
        match self {
            ExportError::MalformedReference(_) => ExportStage::Reference,
            ExportError::Authentication { .. }
            | ExportError::RepositoryNotFound(_)
            | ExportError::Resolution { .. } => ExportStage::Resolution,
            ExportError::Traversal { .. } | ExportError::Cancelled => ExportStage::Traversal,
            ExportError::Write { .. } => ExportStage::Write,
            ExportError::Config(_) => ExportStage::Setup,
        }
    }

    /// Short actionable advice for the user
    pub fn hint(&self) -> &'static str {
        match self {
            ExportError::MalformedReference(_) => {
                "Use a URL of the form https://github.com/<owner>/<repo>."
            }
            ExportError::Authentication { .. } => {
                "Check that the access token is valid, not expired, and allowed to read the repository."
            }
            ExportError::RepositoryNotFound(_) => {
                "Check the URL; private repositories need a token with access to them."
            }
            ExportError::Resolution { .. } => {
                "The remote API could not be reached; check the network and --api-url."
            }
            ExportError::Traversal { .. } => {
                "The remote API failed mid-export; nothing was written. Try again later."
            }
            ExportError::Write { .. } => "Check that the output directory exists and is writable.",
            ExportError::Cancelled => "The export was stopped before completion; nothing was written.",
            ExportError::Config(_) => "Run with --help to see the accepted options.",
        }
    }

    /// Process exit code for the binary
    pub fn exit_code(&self) -> u8 {
        match self.stage() {
            ExportStage::Setup => 2,
            ExportStage::Reference => 3,
            ExportStage::Resolution => 4,
            ExportStage::Traversal => 5,
            ExportStage::Write => 6,
        }
    }
}

/// Specialized Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Creates an ExportError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::ExportError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_classification() {
        let malformed = ExportError::MalformedReference("github.com".to_string());
        assert_eq!(malformed.stage(), ExportStage::Reference);

        let not_found = ExportError::RepositoryNotFound("acme/widgets".to_string());
        assert_eq!(not_found.stage(), ExportStage::Resolution);

        let auth = ExportError::Authentication {
            repository: "acme/widgets".to_string(),
            message: "Bad credentials".to_string(),
        };
        assert_eq!(auth.stage(), ExportStage::Resolution);
        assert_ne!(auth.exit_code(), malformed.exit_code());

        let traversal = ExportError::Traversal {
            path: "src".to_string(),
            source: ApiError::Transport("connection reset".to_string()),
        };
        assert_eq!(traversal.stage(), ExportStage::Traversal);
        assert!(traversal.to_string().contains("'src'"));

        let write = ExportError::Write {
            path: PathBuf::from("/nope/out.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(write.stage(), ExportStage::Write);
        assert_eq!(write.stage().to_string(), "write");
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: u32) -> Result<()> {
            ensure!(value < 10, Config, "value {} is too large", value);
            Ok(())
        }

        assert!(check(3).is_ok());
        match check(42) {
            Err(ExportError::Config(msg)) => assert_eq!(msg, "value 42 is too large"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
