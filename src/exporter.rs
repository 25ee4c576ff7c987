/*!
 * Repository tree walking and export
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, info};

use crate::config::Config;
use crate::decoder::decode_file;
use crate::error::{ExportError, Result};
use crate::github::{ApiError, GitHubClient, RemoteEntry, RemoteRepository, RepositoryApi, RepositoryReference};
use crate::progress::StatusReporter;
use crate::types::{DecodeFailure, EntryKind, ExportResult, FileContent, SkippedFile};
use crate::utils::{format_file_size, join_path};
use crate::writer::TextWriter;

/// Outcome of a successful export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Path of the written document
    pub output_file: PathBuf,
    /// `owner/name` of the exported repository
    pub repository: String,
    /// Requested ref, or the repository's default branch
    pub git_ref: Option<String>,
    /// Everything collected by the walk
    pub result: ExportResult,
    /// Time from connecting to the written file
    pub duration: Duration,
}

/// Handle that stops a running export at its next step
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Walks a remote repository and writes the flattened document
pub struct Exporter<A> {
    /// Remote repository access
    api: A,
    /// Exporter configuration
    config: Config,
    /// Checked before every work-list step
    cancel: CancelHandle,
}

impl<A: RepositoryApi> Exporter<A> {
    /// Create a new exporter
    pub fn new(api: A, config: Config) -> Self {
        Self {
            api,
            config,
            cancel: CancelHandle::default(),
        }
    }

    /// Handle that cancels this exporter's running export
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Export the repository at `url`, returning where the document was written
    ///
    /// Failures are reported through `reporter` before being returned.
    pub fn export<R>(&self, url: &str, reporter: &R) -> Result<ExportSummary>
    where
        R: StatusReporter + ?Sized,
    {
        let outcome = self.run(url, reporter);
        if let Err(e) = &outcome {
            debug!(stage = %e.stage(), "Export failed: {}", e);
            reporter.report(&format!("Error exporting repository: {}", e));
        }
        outcome
    }

    fn run<R>(&self, url: &str, reporter: &R) -> Result<ExportSummary>
    where
        R: StatusReporter + ?Sized,
    {
        let reference: RepositoryReference = url.parse()?;
        let start = Instant::now();

        reporter.report(&format!("Connecting to repository {}...", reference));
        let repository = self.resolve(&reference)?;
        info!(repository = %repository.full_name, private = repository.private, "Repository resolved");

        reporter.report("Starting repository processing...");
        let result = self.walk(&repository, reporter)?;

        // The file name carries the time of writing, not of the request
        let writer = TextWriter::new(&self.config.output_dir);
        let written_at = Local::now();
        let output_file = writer.output_path(&repository.name, &written_at);
        reporter.report(&format!("Saving results to {}...", output_file.display()));
        writer.write_to(&output_file, &repository.name, &result, &written_at)?;

        reporter.report(&format!(
            "Repository exported successfully to: {}",
            output_file.display()
        ));

        let git_ref = self.config.git_ref.clone().or(repository.default_branch);
        Ok(ExportSummary {
            output_file,
            repository: repository.full_name,
            git_ref,
            result,
            duration: start.elapsed(),
        })
    }

    /// Look the repository up, classifying access failures
    fn resolve(&self, reference: &RepositoryReference) -> Result<RemoteRepository> {
        self.api.resolve(reference).map_err(|e| match e {
            ApiError::NotFound(_) => ExportError::RepositoryNotFound(reference.to_string()),
            ApiError::Unauthorized(message) | ApiError::Forbidden(message) => {
                ExportError::Authentication {
                    repository: reference.to_string(),
                    message,
                }
            }
            other => ExportError::Resolution {
                repository: reference.to_string(),
                source: other,
            },
        })
    }

    /// Walk the whole tree depth-first, in API order at every level
    ///
    /// Uses an explicit stack instead of recursion; entries of a listing are
    /// pushed in reverse so they pop in their original order, and a
    /// directory's children are pushed on top of its remaining siblings.
    pub fn walk<R>(&self, repository: &RemoteRepository, reporter: &R) -> Result<ExportResult>
    where
        R: StatusReporter + ?Sized,
    {
        let mut result = ExportResult::new();
        let mut pending: Vec<(RemoteEntry, String)> = Vec::new();

        self.check_cancelled()?;
        let root = match self.api.list_directory(repository, "") {
            Ok(entries) => entries,
            // The API has no root listing for a repository without commits
            Err(ApiError::NotFound(_)) => {
                info!(repository = %repository.full_name, "Repository has no files");
                Vec::new()
            }
            Err(source) => {
                return Err(ExportError::Traversal {
                    path: String::new(),
                    source,
                });
            }
        };
        push_listing(&mut pending, root, "");

        while let Some((entry, path)) = pending.pop() {
            self.check_cancelled()?;

            if entry.is_dir() {
                debug!(%path, "Entering directory");
                reporter.report(&format!("Processing directory: {}", path));
                result.record(path.as_str(), EntryKind::Directory);

                let children = self.list(repository, &entry.path, &path)?;
                push_listing(&mut pending, children, &path);
            } else {
                debug!(%path, size = entry.size, "Processing file");
                reporter.report(&format!("Processing file: {}", path));
                result.record(path.as_str(), EntryKind::File);
                self.process_file(repository, &entry, path, &mut result, reporter)?;
            }
        }

        info!(
            directories = result.directory_count(),
            files = result.file_count(),
            decoded = result.contents.len(),
            "Walk complete"
        );
        Ok(result)
    }

    /// Fetch and decode one file; only network failures are fatal
    fn process_file<R>(
        &self,
        repository: &RemoteRepository,
        entry: &RemoteEntry,
        path: String,
        result: &mut ExportResult,
        reporter: &R,
    ) -> Result<()>
    where
        R: StatusReporter + ?Sized,
    {
        if let Some(limit) = self.config.max_file_size {
            if entry.size > limit {
                debug!(%path, size = entry.size, limit, "Skipping file content over size limit");
                reporter.report(&format!(
                    "Skipping content of {} ({})",
                    path,
                    format_file_size(entry.size)
                ));
                result.skipped.push(SkippedFile {
                    path,
                    size: entry.size,
                });
                return Ok(());
            }
        }

        let file = self
            .api
            .fetch_file(repository, &entry.path)
            .map_err(|source| ExportError::Traversal {
                path: path.clone(),
                source,
            })?;

        match decode_file(&file, self.config.decode_policy) {
            Ok(content) => result.contents.push(FileContent { path, content }),
            Err(e) => {
                debug!(%path, "Failed to decode file: {}", e);
                reporter.report(&format!("Error processing {}: {}", path, e));
                result.failures.push(DecodeFailure {
                    path,
                    reason: e.to_string(),
                });
            }
        }

        Ok(())
    }

    /// List a directory, attributing failures to its relative path
    fn list(&self, repository: &RemoteRepository, api_path: &str, path: &str) -> Result<Vec<RemoteEntry>> {
        self.api
            .list_directory(repository, api_path)
            .map_err(|source| ExportError::Traversal {
                path: path.to_string(),
                source,
            })
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        Ok(())
    }
}

/// Push a listing so that its first entry is popped next
fn push_listing(pending: &mut Vec<(RemoteEntry, String)>, entries: Vec<RemoteEntry>, prefix: &str) {
    pending.extend(entries.into_iter().rev().map(|entry| {
        let path = join_path(prefix, &entry.name);
        (entry, path)
    }));
}

/// Export `config.repo_url` through the GitHub API
pub fn export_repository<R>(config: &Config, reporter: &R) -> Result<ExportSummary>
where
    R: StatusReporter + ?Sized,
{
    let client = GitHubClient::from_config(config).map_err(|e| {
        reporter.report(&format!("Error exporting repository: {}", e));
        e
    })?;
    if !client.is_authenticated() {
        debug!("No token given, using anonymous access");
    }

    Exporter::new(client, config.clone()).export(&config.repo_url, reporter)
}
