// persister.rs — Staging sink and atomic publish of the data file.
//
// Readers may open the target at any moment. Writing to it directly would let
// them see a half-written JSON document, so all bytes go to a staging file
// first and the staging file is renamed over the target once complete.
// rename(2) within one filesystem replaces the directory entry atomically:
// a reader holds either the old inode or the new one.
//
// At most one sink is live per persister. Acquiring a new one drops the
// previous sink and truncates the staging file, so partial output from a
// failed attempt can never leak into the next commit.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::PersistError;

/// Staging path used when none is configured: `<target file name>.tmp` in the
/// target's own directory, which keeps the final rename on one filesystem.
pub fn default_staging_path(target: &Path) -> PathBuf {
    let mut file_name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    file_name.push(".tmp");
    match target.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Exclusive writable destination bound to the staging file.
///
/// Obtained from [`Persister::acquire_sink`]. Bytes written here are invisible
/// to consumers until [`Persister::commit`] succeeds.
#[derive(Debug)]
pub struct StagingSink {
    writer: BufWriter<File>,
    path: PathBuf,
    written: u64,
}

impl StagingSink {
    fn new(file: File, path: PathBuf) -> Self {
        Self {
            writer: BufWriter::new(file),
            path,
            written: 0,
        }
    }

    /// Path of the staging file this sink writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes accepted by this sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flush buffered bytes and sync them to disk, returning the file handle.
    fn finish(self) -> Result<File, PersistError> {
        let path = self.path;
        let file = self.writer.into_inner().map_err(|e| PersistError::Write {
            path: path.clone(),
            source: e.into_error(),
        })?;
        file.sync_all()
            .map_err(|source| PersistError::Write { path, source })?;
        Ok(file)
    }
}

impl Write for StagingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Publishes a data file through a staging file and an atomic rename.
#[derive(Debug)]
pub struct Persister {
    target: PathBuf,
    staging: PathBuf,
    sink: Option<StagingSink>,
}

impl Persister {
    /// Create a persister for `target`.
    ///
    /// `staging` defaults to [`default_staging_path`]. A staging path on a
    /// different filesystem than the target makes every commit fail.
    pub fn new(target: impl Into<PathBuf>, staging: Option<PathBuf>) -> Self {
        let target = target.into();
        let staging = staging.unwrap_or_else(|| default_staging_path(&target));
        Self {
            target,
            staging,
            sink: None,
        }
    }

    /// The published file.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The write-in-progress file.
    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// Whether a sink is currently open.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// The open sink, if one was acquired and not yet committed.
    pub fn sink_mut(&mut self) -> Option<&mut StagingSink> {
        self.sink.as_mut()
    }

    /// Open a fresh sink on the staging file.
    ///
    /// Any previously acquired sink is dropped first, and the staging file is
    /// created or truncated. Fails if the staging directory cannot be created
    /// or the staging file cannot be opened for writing.
    pub fn acquire_sink(&mut self) -> Result<&mut StagingSink, PersistError> {
        if self.sink.take().is_some() {
            tracing::debug!(staging = %self.staging.display(), "discarding previous sink");
        }

        if let Some(parent) = self.staging.parent() {
            ensure_directory(parent)?;
        }

        let file = File::create(&self.staging).map_err(|source| PersistError::OpenStaging {
            path: self.staging.clone(),
            source,
        })?;

        tracing::debug!(staging = %self.staging.display(), "acquired clean staging sink");
        Ok(self.sink.insert(StagingSink::new(file, self.staging.clone())))
    }

    /// Publish the staged content by renaming the staging file over the target.
    ///
    /// The open sink is consumed whether or not the commit succeeds. On any
    /// error the target is left untouched.
    pub fn commit(&mut self) -> Result<(), PersistError> {
        let sink = self.sink.take().ok_or(PersistError::NoSink)?;
        let file = sink.finish()?;

        let staged_len = file
            .metadata()
            .map_err(|source| PersistError::Write {
                path: self.staging.clone(),
                source,
            })?
            .len();
        drop(file);

        if staged_len == 0 {
            return Err(PersistError::EmptyOutput {
                path: self.staging.clone(),
            });
        }

        if let Some(parent) = self.target.parent() {
            ensure_directory(parent)?;
        }

        tracing::info!(
            target_path = %self.target.display(),
            bytes = staged_len,
            "Persisting RDS data"
        );

        fs::rename(&self.staging, &self.target).map_err(|source| PersistError::Rename {
            from: self.staging.clone(),
            to: self.target.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Create `dir` (and its ancestors) unless it already is a directory.
fn ensure_directory(dir: &Path) -> Result<(), PersistError> {
    // A bare file name has an empty parent: the current directory.
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(PersistError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
