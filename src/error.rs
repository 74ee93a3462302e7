//! Error types for the YouTrack client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to a YouTrack server.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication failed - the token is missing, expired or revoked.
    #[error("authentication failed: check your permanent token")]
    Unauthorized,

    /// Permission denied - the token lacks access to the resource.
    #[error("permission denied: you don't have access to this resource")]
    Forbidden,

    /// Resource not found.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The server answered with a status code outside the documented set.
    #[error("unexpected status code {status} for {context}")]
    UnexpectedStatus {
        /// The HTTP status the server returned.
        status: StatusCode,
        /// Method and URL of the failed request.
        context: String,
    },

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected entity.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// The request could not be built from the given arguments.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Maps a non-success HTTP status to the matching error variant.
    pub fn from_status(status: StatusCode, context: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Error::Unauthorized,
            StatusCode::FORBIDDEN => Error::Forbidden,
            StatusCode::NOT_FOUND => Error::NotFound(context.to_string()),
            _ => Error::UnexpectedStatus {
                status,
                context: context.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_status_401() {
        let err = Error::from_status(StatusCode::UNAUTHORIZED, "test");
        assert!(matches!(err, Error::Unauthorized));
    }

    #[test]
    fn test_error_from_status_403() {
        let err = Error::from_status(StatusCode::FORBIDDEN, "test");
        assert!(matches!(err, Error::Forbidden));
    }

    #[test]
    fn test_error_from_status_404() {
        let err = Error::from_status(StatusCode::NOT_FOUND, "issue HD-25");
        match err {
            Error::NotFound(context) => assert_eq!(context, "issue HD-25"),
            _ => panic!("expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_status_500() {
        let err = Error::from_status(StatusCode::INTERNAL_SERVER_ERROR, "GET https://server");
        match err {
            Error::UnexpectedStatus { status, context } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(context, "GET https://server");
            }
            _ => panic!("expected UnexpectedStatus error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("HD-25".to_string());
        assert_eq!(err.to_string(), "resource not found: HD-25");

        let err = Error::Unauthorized;
        assert!(err.to_string().contains("permanent token"));
    }
}
