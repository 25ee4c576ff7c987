/*!
 * Wire types returned by the repository contents API
 */

use serde::Deserialize;

/// Repository metadata returned by the resolve call
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRepository {
    /// Repository name as reported by the API
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    /// Branch used when no explicit ref is requested
    #[serde(default)]
    pub default_branch: Option<String>,
    /// Whether the repository is private
    #[serde(default)]
    pub private: bool,
}

/// Entry type as reported by the contents API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    Dir,
    File,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One item of a directory listing
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntry {
    /// Entry name, without its parent path
    pub name: String,
    /// Path from the repository root, as the API spells it
    pub path: String,
    #[serde(rename = "type")]
    pub kind: RemoteKind,
    /// Size in bytes (0 for directories)
    #[serde(default)]
    pub size: u64,
}

impl RemoteEntry {
    /// Whether the walker should descend into this entry
    pub fn is_dir(&self) -> bool {
        self.kind == RemoteKind::Dir
    }
}

/// A single file fetched from the contents API
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    /// Path from the repository root
    pub path: String,
    /// Encoded payload; absent for submodules and files too large to inline
    #[serde(default)]
    pub content: Option<String>,
    /// Payload encoding, normally `base64`; `none` when the API refused to inline it
    #[serde(default)]
    pub encoding: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_directory_listing() {
        let body = r#"[
            {"name": "src", "path": "src", "type": "dir", "size": 0, "sha": "a1"},
            {"name": "README.md", "path": "README.md", "type": "file", "size": 12, "sha": "b2"},
            {"name": "vendor", "path": "vendor", "type": "submodule", "size": 0, "sha": "c3"},
            {"name": "weird", "path": "weird", "type": "something-new"}
        ]"#;

        let entries: Vec<RemoteEntry> = serde_json::from_str(body).unwrap();

        assert_eq!(entries.len(), 4);
        assert!(entries[0].is_dir());
        assert_eq!(entries[1].kind, RemoteKind::File);
        assert_eq!(entries[1].size, 12);
        assert_eq!(entries[2].kind, RemoteKind::Submodule);
        assert_eq!(entries[3].kind, RemoteKind::Other);
        assert_eq!(entries[3].size, 0);
    }

    #[test]
    fn test_deserialize_file_without_inline_content() {
        let body = r#"{"path": "big.bin", "content": "", "encoding": "none", "size": 2000000}"#;
        let file: RemoteFile = serde_json::from_str(body).unwrap();

        assert_eq!(file.encoding.as_deref(), Some("none"));
        assert_eq!(file.content.as_deref(), Some(""));
        assert_eq!(file.size, 2_000_000);
    }
}
