//! Error types for snapshot sources.
//!
//! Every failure a source can produce collapses onto one of three
//! [`ErrorKind`]s. The resolver never returns these to its caller; they are
//! logged per tier and turn into a fall-through to the next tier.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid category name: {0:?}")]
    InvalidCategory(String),
}

/// The three-way failure taxonomy used in tier traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request rejected, timed out, or answered with a non-success status.
    NetworkFailure,
    /// Body is not valid JSON or lacks required fields.
    ParseFailure,
    /// Expected file or manifest entry is absent.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::ParseFailure => "parse_failure",
            ErrorKind::NotFound => "not_found",
        })
    }
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Http(e) if e.is_decode() => ErrorKind::ParseFailure,
            ResolveError::Http(_)
            | ResolveError::Status { .. }
            | ResolveError::Timeout(_)
            | ResolveError::Url(_) => ErrorKind::NetworkFailure,
            ResolveError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            ResolveError::Io(_) => ErrorKind::NetworkFailure,
            ResolveError::Json(_) => ErrorKind::ParseFailure,
            ResolveError::NotFound(_) | ResolveError::InvalidCategory(_) => ErrorKind::NotFound,
        }
    }

    /// Whether trying the same request again could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ResolveError::Status { status, .. } => *status == 429 || *status >= 500,
            ResolveError::Http(e) => !e.is_decode() && !e.is_builder(),
            ResolveError::Timeout(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
