/*!
 * Output document format
 *
 * The layout is fixed: a three-line header, an optional list of files
 * skipped for size, the structure section in visitation order, then one
 * delimited block per decoded file. [`ParsedDocument::parse`] reads it back.
 */

use chrono::{DateTime, TimeZone};
use thiserror::Error;

use crate::types::{EntryKind, FileContent, StructureEntry};

/// Tool name written on the first line
pub const TOOL_TITLE: &str = "CodeForias - Exportación de Repositorio";
/// Prefix of every output file name
pub const FILE_PREFIX: &str = "codeforias";

pub(crate) const DATE_LABEL: &str = "Fecha: ";
pub(crate) const REPOSITORY_LABEL: &str = "Repositorio: ";
pub(crate) const SKIPPED_HEADING: &str = "Archivos omitidos por tamaño:";
pub(crate) const STRUCTURE_HEADING: &str = "Estructura de Archivos:";
pub(crate) const CONTENT_HEADING: &str = "Contenido de Archivos:";
pub(crate) const FILE_LABEL: &str = "Archivo: ";

pub(crate) const SECTION_RULE_WIDTH: usize = 50;
pub(crate) const FILE_RULE_WIDTH: usize = 80;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A line of `=` characters
pub(crate) fn rule(width: usize) -> String {
    "=".repeat(width)
}

/// Output file name for `repository` written at `at`
pub fn output_file_name<Tz>(repository: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}.txt",
        FILE_PREFIX,
        sanitize_file_component(repository),
        at.format(FILE_TIMESTAMP_FORMAT)
    )
}

/// Replace characters that are not safe in file names
fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Errors from reading a document back
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DocumentError {
    /// A required line or section was not where the format puts it
    #[error("missing {0}")]
    Missing(&'static str),

    /// A structure or skipped-file line could not be parsed
    #[error("invalid line: {0:?}")]
    InvalidLine(String),
}

/// A document read back from its text form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Export date as written in the header
    pub date: String,
    /// Repository name from the header
    pub repository: String,
    /// Paths listed as skipped for size
    pub skipped: Vec<String>,
    /// Structure section, in document order
    pub structure: Vec<StructureEntry>,
    /// File blocks, in document order
    pub contents: Vec<FileContent>,
}

impl ParsedDocument {
    /// Parse the text of an output document
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let mut lines = text.split('\n');

        if lines.next() != Some(TOOL_TITLE) {
            return Err(DocumentError::Missing("title line"));
        }
        let date = lines
            .next()
            .and_then(|l| l.strip_prefix(DATE_LABEL))
            .ok_or(DocumentError::Missing("date line"))?
            .to_string();
        let repository = lines
            .next()
            .and_then(|l| l.strip_prefix(REPOSITORY_LABEL))
            .ok_or(DocumentError::Missing("repository line"))?
            .to_string();
        if lines.next() != Some("") {
            return Err(DocumentError::Missing("blank line after header"));
        }

        let mut heading = lines.next();
        let mut skipped = Vec::new();
        if heading == Some(SKIPPED_HEADING) {
            for line in lines.by_ref() {
                if line.is_empty() {
                    break;
                }
                let entry = line
                    .strip_prefix("- ")
                    .and_then(|l| l.rsplit_once(" ("))
                    .ok_or_else(|| DocumentError::InvalidLine(line.to_string()))?;
                skipped.push(entry.0.to_string());
            }
            heading = lines.next();
        }

        let section_rule = rule(SECTION_RULE_WIDTH);
        if heading != Some(STRUCTURE_HEADING) || lines.next() != Some(section_rule.as_str()) {
            return Err(DocumentError::Missing("structure section"));
        }

        let mut structure = Vec::new();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }
            let (kind, path) = line
                .split_once(": ")
                .ok_or_else(|| DocumentError::InvalidLine(line.to_string()))?;
            let kind = kind
                .parse::<EntryKind>()
                .map_err(|_| DocumentError::InvalidLine(line.to_string()))?;
            structure.push(StructureEntry {
                path: path.to_string(),
                kind,
            });
        }

        if lines.next() != Some(CONTENT_HEADING) || lines.next() != Some(section_rule.as_str()) {
            return Err(DocumentError::Missing("content section"));
        }

        let body = lines.collect::<Vec<_>>().join("\n");
        let contents = parse_file_blocks(&body)?;

        Ok(Self {
            date,
            repository,
            skipped,
            structure,
            contents,
        })
    }
}

/// Split the content section into per-file blocks
fn parse_file_blocks(body: &str) -> Result<Vec<FileContent>, DocumentError> {
    let file_rule = rule(FILE_RULE_WIDTH);
    let marker = format!("\n{}\n{}", file_rule, FILE_LABEL);
    let closing = format!("\n{}\n", file_rule);

    let mut contents = Vec::new();
    let mut rest = match body.find(&marker) {
        Some(start) => &body[start..],
        None => return Ok(contents),
    };

    while let Some(after_marker) = rest.strip_prefix(marker.as_str()) {
        let (path, after_path) = after_marker
            .split_once(closing.as_str())
            .ok_or(DocumentError::Missing("file block header"))?;

        let (block, next) = match after_path.find(&marker) {
            Some(end) => after_path.split_at(end),
            None => (after_path, ""),
        };

        // Each block ends with the newline written after the content
        let content = block.strip_suffix('\n').unwrap_or(block);
        contents.push(FileContent {
            path: path.to_string(),
            content: content.to_string(),
        });
        rest = next;
    }

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, Utc};

    #[test]
    fn test_output_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            output_file_name("widgets", &at),
            "codeforias_widgets_20240309_070501.txt"
        );
        assert_eq!(
            output_file_name("we:ird/name", &at),
            "codeforias_we_ird_name_20240309_070501.txt"
        );
    }

    #[test]
    fn test_file_names_differ_across_seconds() {
        let first = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let second = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
        assert_ne!(
            output_file_name("widgets", &first),
            output_file_name("widgets", &second)
        );
    }

    #[test]
    fn test_parse_rejects_foreign_text() {
        assert_eq!(
            ParsedDocument::parse("hello world"),
            Err(DocumentError::Missing("title line"))
        );
    }

    #[test]
    fn test_parse_minimal_document() {
        let text = format!(
            "{}\nFecha: 2024-03-09 07:05:01\nRepositorio: widgets\n\n{}\n{}\nfile: a: b.txt\n\n{}\n{}\n",
            TOOL_TITLE,
            STRUCTURE_HEADING,
            rule(50),
            CONTENT_HEADING,
            rule(50)
        );

        let parsed = ParsedDocument::parse(&text).unwrap();
        assert_eq!(parsed.date, "2024-03-09 07:05:01");
        assert_eq!(parsed.repository, "widgets");
        assert_eq!(parsed.structure.len(), 1);
        assert_eq!(parsed.structure[0].path, "a: b.txt");
        assert!(parsed.contents.is_empty());
    }
}
