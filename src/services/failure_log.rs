//! Persistent failure log
//!
//! Append-only side channel recording one timestamped line per failure event,
//! independent of console visibility. The handle is created by the entry point
//! and passed into the pipeline explicitly; appending is advisory, so a log
//! write failure itself only produces a log warning and never an error.

use crate::error::{HarvestError, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Timestamp format matching `[2024/03/01 05:12:09 PM]`
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %I:%M:%S %p";

/// Handle to the process-wide append-only error log
pub struct FailureLog {
    inner: Option<Mutex<File>>,
    path: Option<PathBuf>,
}

impl FailureLog {
    /// Open (or create) the failure log at `path` in append mode
    ///
    /// # Errors
    /// - Failed to open or create the file
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| HarvestError::file_io_error("open failure log", &path, e))?;
        Ok(Self {
            inner: Some(Mutex::new(file)),
            path: Some(path),
        })
    }

    /// Create a disabled log that discards all records (for tests and
    /// library embedding)
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            inner: None,
            path: None,
        }
    }

    /// Path of the underlying file, when enabled
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one timestamped line. Best-effort: failures are reported as a
    /// log warning and otherwise swallowed.
    pub fn record(&self, message: &str) {
        let Some(file) = &self.inner else {
            return;
        };
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let mut guard = match file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(guard, "[{timestamp}] {message}") {
            log::warn!("failed to append to failure log: {e}");
        }
    }
}

impl std::fmt::Debug for FailureLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureLog")
            .field("path", &self.path)
            .field("enabled", &self.inner.is_some())
            .finish()
    }
}
