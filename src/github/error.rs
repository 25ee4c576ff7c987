/*!
 * Error types for remote API operations
 */

use thiserror::Error;

/// Errors reported by a [`RepositoryApi`](super::RepositoryApi) implementation
#[derive(Error, Debug)]
pub enum ApiError {
    /// The credential was missing, invalid or expired (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The credential lacks permission, or the API refused the request (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::UnexpectedResponse(error.to_string())
        } else {
            ApiError::Transport(error.to_string())
        }
    }
}

/// Specialized Result type for remote API operations
pub type ApiResult<T> = Result<T, ApiError>;
