/*!
 * Remote repository access
 *
 * The exporter only talks to [`RepositoryApi`]; [`GitHubClient`] is the
 * production implementation over the GitHub REST contents endpoints.
 */

mod client;
mod error;
mod reference;
mod types;

// Re-export public items
pub use client::{GitHubClient, DEFAULT_API_URL};
pub use error::{ApiError, ApiResult};
pub use reference::RepositoryReference;
pub use types::{RemoteEntry, RemoteFile, RemoteKind, RemoteRepository};

/// Read-only view of a remote repository tree
///
/// Calls are blocking and are never retried by the caller.
pub trait RepositoryApi {
    /// Look the repository up, failing when it does not exist or is not visible
    fn resolve(&self, reference: &RepositoryReference) -> ApiResult<RemoteRepository>;

    /// List the entries directly under `path` ("" for the root), in API order
    fn list_directory(&self, repository: &RemoteRepository, path: &str) -> ApiResult<Vec<RemoteEntry>>;

    /// Fetch a single file with its encoded content
    fn fetch_file(&self, repository: &RemoteRepository, path: &str) -> ApiResult<RemoteFile>;
}

impl<A: RepositoryApi + ?Sized> RepositoryApi for &A {
    fn resolve(&self, reference: &RepositoryReference) -> ApiResult<RemoteRepository> {
        (**self).resolve(reference)
    }

    fn list_directory(&self, repository: &RemoteRepository, path: &str) -> ApiResult<Vec<RemoteEntry>> {
        (**self).list_directory(repository, path)
    }

    fn fetch_file(&self, repository: &RemoteRepository, path: &str) -> ApiResult<RemoteFile> {
        (**self).fetch_file(repository, path)
    }
}
