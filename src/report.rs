/*!
 * Reporting functionality for CodeForias
 *
 * Provides functionality for generating formatted reports of export results
 * using the tabled library for clean, consistent table rendering.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::exporter::ExportSummary;
use crate::types::DecodeFailure;
use crate::utils::format_file_size;

/// Statistics for a finished export
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Output file path
    pub output_file: String,
    /// `owner/name`
    pub repository: String,
    /// Branch, tag or commit the contents were read at
    pub git_ref: Option<String>,
    /// Time taken by the export
    pub duration: Duration,
    /// Number of directories visited
    pub directories: usize,
    /// Number of files visited
    pub files: usize,
    /// Number of files whose text was written
    pub decoded_files: usize,
    /// Number of files skipped for size
    pub skipped_files: usize,
    /// Total number of lines written
    pub total_lines: usize,
    /// Total bytes of text written
    pub total_bytes: u64,
    /// Files that could not be decoded
    pub failures: Vec<DecodeFailure>,
}

impl From<&ExportSummary> for ExportReport {
    fn from(summary: &ExportSummary) -> Self {
        let result = &summary.result;
        Self {
            output_file: summary.output_file.display().to_string(),
            repository: summary.repository.clone(),
            git_ref: summary.git_ref.clone(),
            duration: summary.duration,
            directories: result.directory_count(),
            files: result.file_count(),
            decoded_files: result.contents.len(),
            skipped_files: result.skipped.len(),
            total_lines: result.total_lines(),
            total_bytes: result.total_bytes(),
            failures: result.failures.clone(),
        }
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for export results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &ExportReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ExportReport) {
        println!("\n{}", self.generate_report(report));
    }

    fn styled(mut table: Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create a summary table using the tabled crate
    fn create_summary_table(&self, report: &ExportReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: &'static str,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "📂 Output File",
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "📦 Repository",
                value: report.repository.clone(),
            },
            SummaryRow {
                key: "🌿 Ref",
                value: report.git_ref.clone().unwrap_or_else(|| "-".to_string()),
            },
            SummaryRow {
                key: "⏱️ Process Time",
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "🗂️ Directories",
                value: self.format_number(report.directories),
            },
            SummaryRow {
                key: "📄 Files",
                value: format!(
                    "{} ({} written, {} skipped, {} undecodable)",
                    self.format_number(report.files),
                    self.format_number(report.decoded_files),
                    self.format_number(report.skipped_files),
                    self.format_number(report.failures.len())
                ),
            },
            SummaryRow {
                key: "📝 Total Lines",
                value: self.format_number(report.total_lines),
            },
            SummaryRow {
                key: "💾 Text Size",
                value: format_file_size(report.total_bytes),
            },
        ];

        Self::styled(Table::new(rows))
    }

    // Create a table of files that could not be decoded
    fn create_failures_table(&self, report: &ExportReport) -> String {
        #[derive(Tabled)]
        struct FailureRow<'a> {
            #[tabled(rename = "File Path")]
            path: &'a str,

            #[tabled(rename = "Reason")]
            reason: &'a str,
        }

        let rows = report.failures.iter().map(|failure| FailureRow {
            path: &failure.path,
            reason: &failure.reason,
        });

        Self::styled(Table::new(rows))
    }

    // Generate a console table report
    fn generate_console_report(&self, report: &ExportReport) -> String {
        let summary = format!(
            "✅  EXPORT COMPLETE\n{}",
            self.create_summary_table(report)
        );

        if report.failures.is_empty() {
            return summary;
        }

        format!(
            "⚠️  FILES WITHOUT CONTENT\n{}\n\n{}",
            self.create_failures_table(report),
            summary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(failures: Vec<DecodeFailure>) -> ExportReport {
        ExportReport {
            output_file: "codeforias_widgets_20240517_143009.txt".to_string(),
            repository: "acme/widgets".to_string(),
            git_ref: Some("main".to_string()),
            duration: Duration::from_millis(1500),
            directories: 3,
            files: 12_500,
            decoded_files: 12_000,
            skipped_files: 0,
            total_lines: 1_250_000,
            total_bytes: 2048,
            failures,
        }
    }

    #[test]
    fn test_format_number() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        assert_eq!(reporter.format_number(999), "999");
        assert_eq!(reporter.format_number(12_500), "12.5K");
        assert_eq!(reporter.format_number(1_240_000), "1.2M");
    }

    #[test]
    fn test_console_report_contents() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        let text = reporter.generate_report(&report(Vec::new()));

        assert!(text.contains("EXPORT COMPLETE"));
        assert!(text.contains("acme/widgets"));
        assert!(text.contains("main"));
        assert!(text.contains("codeforias_widgets_20240517_143009.txt"));
        assert!(text.contains("2.00 KB"));
        assert!(!text.contains("FILES WITHOUT CONTENT"));
    }

    #[test]
    fn test_console_report_lists_failures() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        let text = reporter.generate_report(&report(vec![DecodeFailure {
            path: "assets/logo.png".to_string(),
            reason: "invalid base64 payload".to_string(),
        }]));

        assert!(text.contains("FILES WITHOUT CONTENT"));
        assert!(text.contains("assets/logo.png"));
    }
}
