/*!
 * Text document writer for CodeForias
 */

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tempfile::NamedTempFile;
use tracing::info;

use crate::document::{
    output_file_name, rule, CONTENT_HEADING, DATE_FORMAT, DATE_LABEL, FILE_LABEL,
    FILE_RULE_WIDTH, REPOSITORY_LABEL, SECTION_RULE_WIDTH, SKIPPED_HEADING, STRUCTURE_HEADING,
    TOOL_TITLE,
};
use crate::error::{ExportError, Result};
use crate::types::ExportResult;
use crate::utils::format_file_size;

/// Serializes an export into the flat text document
pub struct TextWriter {
    /// Directory output files are created in
    output_dir: PathBuf,
}

impl TextWriter {
    /// Create a writer targeting `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Path the document for `repository` gets when written at `at`
    pub fn output_path(&self, repository: &str, at: &DateTime<Local>) -> PathBuf {
        self.output_dir.join(output_file_name(repository, at))
    }

    /// Write the document to `path`, replacing any existing file
    ///
    /// The document is staged next to `path` and renamed into place, so a
    /// failed write leaves no partial file behind.
    pub fn write_to(
        &self,
        path: &Path,
        repository: &str,
        result: &ExportResult,
        at: &DateTime<Local>,
    ) -> Result<()> {
        self.persist_with(path, |out| self.render(out, repository, result, at))?;

        info!(path = %path.display(), "Document written");
        Ok(())
    }

    /// Run `fill` against a staging file and move it to `path` on success
    fn persist_with<F>(&self, path: &Path, fill: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<NamedTempFile>) -> io::Result<()>,
    {
        let write_error = |source: io::Error| ExportError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Dropping the staging file on any error path deletes it
        let staged = NamedTempFile::new_in(dir).map_err(write_error)?;
        let mut writer = BufWriter::new(staged);
        fill(&mut writer).map_err(write_error)?;
        let staged = writer
            .into_inner()
            .map_err(|e| write_error(e.into_error()))?;
        staged.persist(path).map_err(|e| write_error(e.error))?;

        Ok(())
    }

    /// Render the document into any writer
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        repository: &str,
        result: &ExportResult,
        at: &DateTime<Local>,
    ) -> io::Result<()> {
        self.write_header(out, repository, at)?;
        self.write_skipped(out, result)?;
        self.write_structure(out, result)?;
        self.write_contents(out, result)?;
        Ok(())
    }

    /// Write the title, date and repository lines
    fn write_header<W: Write>(&self, out: &mut W, repository: &str, at: &DateTime<Local>) -> io::Result<()> {
        writeln!(out, "{}", TOOL_TITLE)?;
        writeln!(out, "{}{}", DATE_LABEL, at.format(DATE_FORMAT))?;
        writeln!(out, "{}{}", REPOSITORY_LABEL, repository)?;
        writeln!(out)
    }

    /// Write the list of files skipped for size, if any
    fn write_skipped<W: Write>(&self, out: &mut W, result: &ExportResult) -> io::Result<()> {
        if result.skipped.is_empty() {
            return Ok(());
        }

        writeln!(out, "{}", SKIPPED_HEADING)?;
        for file in &result.skipped {
            writeln!(out, "- {} ({})", file.path, format_file_size(file.size))?;
        }
        writeln!(out)
    }

    /// Write every visited entry in visitation order
    fn write_structure<W: Write>(&self, out: &mut W, result: &ExportResult) -> io::Result<()> {
        writeln!(out, "{}", STRUCTURE_HEADING)?;
        writeln!(out, "{}", rule(SECTION_RULE_WIDTH))?;
        for entry in &result.structure {
            writeln!(out, "{}: {}", entry.kind, entry.path)?;
        }
        Ok(())
    }

    /// Write one delimited block per decoded file
    fn write_contents<W: Write>(&self, out: &mut W, result: &ExportResult) -> io::Result<()> {
        let file_rule = rule(FILE_RULE_WIDTH);

        writeln!(out)?;
        writeln!(out, "{}", CONTENT_HEADING)?;
        writeln!(out, "{}", rule(SECTION_RULE_WIDTH))?;
        for file in &result.contents {
            writeln!(out)?;
            writeln!(out, "{}", file_rule)?;
            writeln!(out, "{}{}", FILE_LABEL, file.path)?;
            writeln!(out, "{}", file_rule)?;
            out.write_all(file.content.as_bytes())?;
            writeln!(out)?;
        }
        Ok(())
    }
}
