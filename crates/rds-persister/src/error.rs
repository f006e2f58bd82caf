// error.rs — Error types for staging and publishing data files.
//
// Every filesystem variant carries the path it failed on, so the health
// message surfaced to operators always names the offending file or directory.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while staging or publishing a data file.
#[derive(Debug, Error)]
pub enum PersistError {
    /// `commit` was called without a sink acquired since the last commit.
    #[error("Writer is not initialized - Fetch the data into the writer before calling persist!")]
    NoSink,

    /// The staged file has zero bytes; an empty dataset is never published.
    #[error("Downloaded RDS data is empty! Refusing to publish {path}")]
    EmptyOutput { path: PathBuf },

    /// A path that must be a directory is occupied by something else.
    #[error("{path} exists but is not a directory")]
    NotADirectory { path: PathBuf },

    /// Creating a parent directory failed.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Opening (creating or truncating) the staging file failed.
    #[error("failed to open staging file {path}: {source}")]
    OpenStaging {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Flushing or syncing the staging file failed.
    #[error("failed to write staging file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The atomic rename of staging onto target failed.
    #[error("failed to move staging file {from} to target {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

impl PersistError {
    /// The path the failure relates to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            PersistError::NoSink => None,
            PersistError::EmptyOutput { path }
            | PersistError::NotADirectory { path }
            | PersistError::CreateDir { path, .. }
            | PersistError::OpenStaging { path, .. }
            | PersistError::Write { path, .. } => Some(path),
            PersistError::Rename { to, .. } => Some(to),
        }
    }
}
