//! Append-only error log file.
//!
//! Entries are written as `[YYYY-MM-DD HH:MM:SS] message`. Writing is
//! fire-and-forget: if the file cannot be opened or written, the entry is
//! dropped and the command carries on.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default log file name, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "logs.txt";

/// Handle to the error log. Cheap to clone and safe to share across worker
/// threads; every entry opens the file in append mode.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    path: Option<PathBuf>,
}

impl ErrorLog {
    /// Logs to the given file.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Discards every entry.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends a timestamped entry. Never fails.
    pub fn record(&self, message: impl AsRef<str>) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = append_entry(path, message.as_ref()) {
            log::debug!("could not write to error log {}: {}", path.display(), e);
        }
    }
}

fn append_entry(path: &Path, message: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "[{}] {}", timestamp, message)
}
