//! Error types for the fetch adapter.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a usable listing for one channel.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetch backend executable could not be found.
    #[error("Fetcher binary not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// The listing took longer than the configured timeout.
    #[error("Channel listing timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The backend exited unsuccessfully.
    #[error("Channel listing failed: {reason}")]
    CommandFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The backend output could not be understood.
    #[error("Failed to parse channel listing: {0}")]
    Parse(String),

    /// The listing contained no usable entries.
    #[error("Channel listing for {channel} returned no usable videos")]
    Empty { channel: String },

    /// I/O error while talking to the backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Short machine-friendly label, used for metrics and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BinaryNotFound { .. } => "binary_not_found",
            Self::Timeout { .. } => "timeout",
            Self::CommandFailed { .. } => "command_failed",
            Self::Parse(_) => "parse",
            Self::Empty { .. } => "empty",
            Self::Io(_) => "io",
        }
    }

    pub fn command_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::CommandFailed {
            reason: reason.into(),
            stderr,
        }
    }
}

/// An individual fetched entry that cannot become a video record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedRecordError {
    #[error("Fetched entry has no video id (title: {title:?})")]
    MissingId { title: Option<String> },
}
