/*!
 * CodeForias - Flatten a GitHub repository into a single text document
 *
 * This library walks a repository through the GitHub contents API and
 * writes every file's path and text into one timestamped report.
 */

pub mod config;
pub mod decoder;
pub mod document;
pub mod error;
pub mod exporter;
pub mod github;
pub mod progress;
pub mod report;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::Config;
pub use decoder::{DecodeError, DecodePolicy};
pub use document::ParsedDocument;
pub use error::{ExportError, ExportStage};
pub use exporter::{export_repository, CancelHandle, ExportSummary, Exporter};
pub use github::{GitHubClient, RepositoryApi, RepositoryReference};
pub use progress::StatusReporter;
pub use report::{ExportReport, ReportFormat, Reporter};
pub use types::{EntryKind, ExportResult};
pub use writer::TextWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
