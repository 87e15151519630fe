//! API client errors.
//!
//! Callers only ever need to tell two cases apart: the server answered with a
//! failure status, or the exchange never completed. [`ApiError::kind`] gives
//! that view; the variants keep the underlying source for logging.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-2xx response.
    Http,
    /// The request could not complete or its body could not be read.
    Transport,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response. `message` is the server `detail` or a fixed fallback.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http { .. } => ErrorKind::Http,
            Self::Transport(_) | Self::Decode(_) => ErrorKind::Transport,
        }
    }

    /// HTTP status for [`ApiError::Http`], `None` otherwise.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an [`ApiError::Http`] from a raw error body.
    pub(crate) fn from_response(status: StatusCode, body: &str, fallback: &str) -> Self {
        Self::Http { status, message: error_message(body, fallback) }
    }
}

/// Extract the user-facing message from an error body.
///
/// A string `detail` is used verbatim. Any other non-null `detail` (FastAPI
/// validation errors are arrays) is rendered as compact JSON. A missing
/// `detail`, or a body that is not JSON, yields `fallback`.
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback.to_owned();
    };

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(Value::Null | Value::String(_)) | None => fallback.to_owned(),
        Some(other) => other.to_string(),
    }
}
