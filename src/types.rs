/*!
 * Core types and data structures for the CodeForias exporter
 */

/// Kind of a visited tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    /// Directory containing other entries
    Directory,
    /// Anything that is not a directory
    File,
}

/// A visited entry in the structure section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureEntry {
    /// Relative path, `/`-separated
    pub path: String,
    /// Entry kind
    pub kind: EntryKind,
}

/// Decoded text of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Relative path, `/`-separated
    pub path: String,
    /// Decoded text
    pub content: String,
}

/// A file whose content was not fetched because of its size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Relative path, `/`-separated
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

/// A file whose content could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    /// Relative path, `/`-separated
    pub path: String,
    /// Reason reported by the decoder
    pub reason: String,
}

/// Everything collected by one walk, in visitation order
#[derive(Debug, Clone, Default)]
pub struct ExportResult {
    /// Every visited entry, pre-order
    pub structure: Vec<StructureEntry>,
    /// Successfully decoded files, in the order they were decoded
    pub contents: Vec<FileContent>,
    /// Files whose content was skipped because of their size
    pub skipped: Vec<SkippedFile>,
    /// Files whose content failed to decode
    pub failures: Vec<DecodeFailure>,
}

impl ExportResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visited entry
    pub fn record(&mut self, path: impl Into<String>, kind: EntryKind) {
        self.structure.push(StructureEntry {
            path: path.into(),
            kind,
        });
    }

    /// Kind recorded for `path`, if it was visited
    pub fn kind_of(&self, path: &str) -> Option<EntryKind> {
        self.structure
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| entry.kind)
    }

    /// Decoded content for `path`, if it was decoded
    pub fn content_of(&self, path: &str) -> Option<&str> {
        self.contents
            .iter()
            .find(|file| file.path == path)
            .map(|file| file.content.as_str())
    }

    /// Number of directories visited
    pub fn directory_count(&self) -> usize {
        self.count_kind(EntryKind::Directory)
    }

    /// Number of files visited
    pub fn file_count(&self) -> usize {
        self.count_kind(EntryKind::File)
    }

    fn count_kind(&self, kind: EntryKind) -> usize {
        self.structure.iter().filter(|entry| entry.kind == kind).count()
    }

    /// Total number of lines across decoded files
    pub fn total_lines(&self) -> usize {
        self.contents.iter().map(|file| file.content.lines().count()).sum()
    }

    /// Total number of bytes of decoded text
    pub fn total_bytes(&self) -> u64 {
        self.contents.iter().map(|file| file.content.len() as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_entry_kind_round_trips_through_text() {
        assert_eq!(EntryKind::Directory.to_string(), "directory");
        assert_eq!(EntryKind::File.to_string(), "file");
        assert_eq!(EntryKind::from_str("directory").unwrap(), EntryKind::Directory);
        assert!(EntryKind::from_str("symlink").is_err());
    }

    #[test]
    fn test_result_lookups_and_counts() {
        let mut result = ExportResult::new();
        result.record("a.txt", EntryKind::File);
        result.record("dir", EntryKind::Directory);
        result.record("dir/b.txt", EntryKind::File);
        result.contents.push(FileContent {
            path: "a.txt".to_string(),
            content: "one\ntwo\n".to_string(),
        });

        assert_eq!(result.kind_of("dir"), Some(EntryKind::Directory));
        assert_eq!(result.kind_of("missing"), None);
        assert_eq!(result.content_of("a.txt"), Some("one\ntwo\n"));
        assert_eq!(result.content_of("dir/b.txt"), None);
        assert_eq!(result.directory_count(), 1);
        assert_eq!(result.file_count(), 2);
        assert_eq!(result.total_lines(), 2);
        assert_eq!(result.total_bytes(), 8);
    }
}
