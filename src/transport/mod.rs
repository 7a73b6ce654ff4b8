//! Search transport seam.
//!
//! The engine never talks HTTP directly; it hands a [`SearchBody`] to a
//! [`SearchTransport`] and gets back a [`PageResult`] or a [`FetchError`].
//!
//! - [`HttpTransport`]: POSTs JSON to the configured catalog endpoint
//! - [`MockTransport`]: scripted in-memory responses for tests

mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{PageResult, SearchBody};

/// Sends one search request and returns the decoded page
#[async_trait]
pub trait SearchTransport: Send + Sync + std::fmt::Debug {
    async fn search(&self, body: &SearchBody) -> Result<PageResult, FetchError>;
}

/// Errors that can occur while fetching a page
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport failed: connection refused, offline, timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status
    #[error("Server error: HTTP {0}")]
    Server(u16),

    /// Payload missing expected fields or not JSON at all
    #[error("Parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Kind carried by the error view state
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network(_) => ErrorKind::Network,
            FetchError::Server(status) => ErrorKind::Server(*status),
            FetchError::Parse(_) => ErrorKind::Parse,
        }
    }

    /// Only network failures are worth retrying; server and parse errors are
    /// terminal for the request
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::Server(status.as_u16());
        }
        if err.is_decode() {
            return FetchError::Parse(err.to_string());
        }
        FetchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(format!("JSON: {}", err))
    }
}

/// Copyable summary of a [`FetchError`] for the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Server(u16),
    Parse,
}

impl ErrorKind {
    /// Advisory shown in place of the results
    pub fn advisory(&self) -> &'static str {
        "Failed to fetch - check your connection"
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::Server(status) => write!(f, "server error (HTTP {})", status),
            ErrorKind::Parse => write!(f, "malformed response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            FetchError::Network("refused".into()).kind(),
            ErrorKind::Network
        );
        assert_eq!(FetchError::Server(503).kind(), ErrorKind::Server(503));
        assert_eq!(FetchError::Parse("no count".into()).kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_only_network_errors_are_transient() {
        assert!(FetchError::Network("offline".into()).is_transient());
        assert!(!FetchError::Server(500).is_transient());
        assert!(!FetchError::Parse("bad".into()).is_transient());
    }

    #[test]
    fn test_json_error_is_parse_error() {
        let err: FetchError = serde_json::from_str::<PageResult>("{}").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_error_kind_serialization() {
        assert_eq!(
            serde_json::to_value(ErrorKind::Server(500)).unwrap(),
            serde_json::json!({"kind": "server", "status": 500})
        );
        assert_eq!(
            serde_json::to_value(ErrorKind::Network).unwrap(),
            serde_json::json!({"kind": "network"})
        );
    }
}
