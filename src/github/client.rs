/*!
 * Blocking GitHub REST client for the contents API
 */

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::error::{ApiError, ApiResult};
use super::reference::RepositoryReference;
use super::types::{RemoteEntry, RemoteFile, RemoteRepository};
use super::RepositoryApi;
use crate::config::Config;
use crate::error::{ExportError, Result};

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("codeforias/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Repository API backed by the GitHub REST contents endpoints
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    token: Option<String>,
    git_ref: Option<String>,
}

impl GitHubClient {
    /// Create a client for `api_url`, authenticated when `token` is given
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| ExportError::Config(format!("Invalid API URL {:?}: {}", api_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExportError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            token,
            git_ref: None,
        })
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(&config.api_url, config.token.clone())?.with_ref(config.git_ref.clone()))
    }

    /// Read contents at a branch, tag or commit instead of the default branch
    pub fn with_ref(mut self, git_ref: Option<String>) -> Self {
        self.git_ref = git_ref;
        self
    }

    /// Whether requests carry a credential
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Build an API URL from path segments, percent-encoding each one
    fn endpoint<'a, I>(&self, segments: I) -> ApiResult<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::UnexpectedResponse(format!("Unusable API URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// URL of `/repos/{owner}/{repo}/contents/{path}`
    pub(crate) fn contents_url(&self, repository: &RemoteRepository, path: &str) -> ApiResult<Url> {
        let mut url = self.endpoint(
            ["repos"]
                .into_iter()
                .chain(repository.full_name.split('/'))
                .chain(["contents"])
                .chain(path.split('/')),
        )?;

        if let Some(git_ref) = &self.git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }

        Ok(url)
    }

    /// Issue a GET and deserialize the JSON body
    fn get<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        debug!(%url, "GET");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = check_status(request.send()?)?;
        Ok(response.json()?)
    }
}

/// GitHub error payload
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn non-success responses into typed errors
fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let resource = response.url().path().to_string();
    let body = response
        .text()
        .unwrap_or_else(|_| "Unable to read error message".to_string());

    Err(classify_status(status, &resource, &body))
}

/// Map a failed status and its body to an [`ApiError`]
fn classify_status(status: StatusCode, resource: &str, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(resource.to_string()),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

impl RepositoryApi for GitHubClient {
    fn resolve(&self, reference: &RepositoryReference) -> ApiResult<RemoteRepository> {
        let url = self.endpoint(["repos", reference.owner.as_str(), reference.name.as_str()])?;
        self.get(url)
    }

    fn list_directory(&self, repository: &RemoteRepository, path: &str) -> ApiResult<Vec<RemoteEntry>> {
        let url = self.contents_url(repository, path)?;
        self.get(url)
    }

    fn fetch_file(&self, repository: &RemoteRepository, path: &str) -> ApiResult<RemoteFile> {
        let url = self.contents_url(repository, path)?;
        self.get(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> RemoteRepository {
        RemoteRepository {
            name: "widgets".to_string(),
            full_name: "acme/widgets".to_string(),
            default_branch: Some("main".to_string()),
            private: false,
        }
    }

    #[test]
    fn test_contents_url_for_root_and_nested_paths() {
        let client = GitHubClient::new(DEFAULT_API_URL, None).unwrap();

        let root = client.contents_url(&repository(), "").unwrap();
        assert_eq!(root.as_str(), "https://api.github.com/repos/acme/widgets/contents");

        let nested = client.contents_url(&repository(), "docs/user guide/intro.md").unwrap();
        assert_eq!(
            nested.as_str(),
            "https://api.github.com/repos/acme/widgets/contents/docs/user%20guide/intro.md"
        );
    }

    #[test]
    fn test_contents_url_with_enterprise_base_and_ref() {
        let client = GitHubClient::new("https://git.example.com/api/v3/", Some("t0ken".to_string()))
            .unwrap()
            .with_ref(Some("release/1.0".to_string()));

        assert!(client.is_authenticated());

        let url = client.contents_url(&repository(), "src").unwrap();
        assert_eq!(
            url.as_str(),
            "https://git.example.com/api/v3/repos/acme/widgets/contents/src?ref=release%2F1.0"
        );
    }

    #[test]
    fn test_classify_status() {
        let resource = "/repos/acme/widgets";

        match classify_status(StatusCode::UNAUTHORIZED, resource, r#"{"message":"Bad credentials"}"#) {
            ApiError::Unauthorized(message) => assert_eq!(message, "Bad credentials"),
            other => panic!("expected unauthorized, got {:?}", other),
        }

        match classify_status(
            StatusCode::FORBIDDEN,
            resource,
            r#"{"message":"Resource not accessible","documentation_url":"https://docs.github.com"}"#,
        ) {
            ApiError::Forbidden(message) => assert_eq!(message, "Resource not accessible"),
            other => panic!("expected forbidden, got {:?}", other),
        }

        match classify_status(StatusCode::NOT_FOUND, resource, r#"{"message":"Not Found"}"#) {
            ApiError::NotFound(path) => assert_eq!(path, resource),
            other => panic!("expected not found, got {:?}", other),
        }

        // Bodies that are not GitHub error JSON are passed through as-is
        match classify_status(StatusCode::BAD_GATEWAY, resource, "upstream timed out") {
            ApiError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream timed out");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_api_url() {
        match GitHubClient::new("not a url", None) {
            Err(ExportError::Config(msg)) => assert!(msg.contains("Invalid API URL")),
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("expected an error"),
        }
    }
}
