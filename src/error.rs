// src/error.rs
// =============================================================================
// Typed errors for the parts of the harvester that are called from many
// places: the HTTP fetcher and the worker pool.
//
// The application layer (main.rs, output.rs) keeps using anyhow::Result,
// these enums are for the places where callers need to match on what went
// wrong instead of just printing it.
// =============================================================================

use std::time::Duration;
use thiserror::Error;

/// Why a single HTTP fetch produced no usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

/// Why a pool task did not produce an extraction result.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("task was cancelled")]
    Cancelled,
}

impl From<tokio::task::JoinError> for TaskError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            TaskError::Cancelled
        } else {
            TaskError::Panicked(err.to_string())
        }
    }
}
