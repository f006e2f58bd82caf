// error.rs — Error types for fetching and reading envelopes.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification kept for diagnostics. The retry policy treats both
/// kinds the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Network or I/O trouble.
    Transport,
    /// The service answered, but rejected the call or sent unusable data.
    Semantic,
}

impl FetchErrorKind {
    /// Stable label for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            FetchErrorKind::Transport => "transport",
            FetchErrorKind::Semantic => "semantic",
        }
    }
}

/// Errors that can occur while fetching reference data into a sink.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The call never got a usable answer (connect, timeout, HTTP transport).
    #[error("transport error fetching '{category}': {message}")]
    Transport { category: String, message: String },

    /// The service rejected the call.
    #[error("server rejected '{category}': {message}")]
    Rejected { category: String, message: String },

    /// The service answered with something that does not decode.
    #[error("malformed response for '{category}': {message}")]
    Malformed { category: String, message: String },

    /// Writing the envelope into the sink failed.
    #[error("failed to write envelope: {0}")]
    Sink(#[from] std::io::Error),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport { .. } | FetchError::Sink(_) => FetchErrorKind::Transport,
            FetchError::Rejected { .. } | FetchError::Malformed { .. } => FetchErrorKind::Semantic,
        }
    }

    /// Category the failing call was made for, if the failure is per-call.
    pub fn category(&self) -> Option<&str> {
        match self {
            FetchError::Transport { category, .. }
            | FetchError::Rejected { category, .. }
            | FetchError::Malformed { category, .. } => Some(category),
            FetchError::Sink(_) => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json only fails on the write side when the writer does.
        FetchError::Sink(e.into())
    }
}

/// Errors that can occur while loading a published envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The file could not be read.
    #[error("failed to read envelope at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid envelope document.
    #[error("invalid envelope at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file is an envelope of a format or version this build does not know.
    #[error("unsupported envelope {format} v{version} at {path}")]
    Unsupported {
        path: PathBuf,
        format: String,
        version: u32,
    },
}
