//! Output persistence with a writable-location fallback.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error_log::ErrorLog;

/// Where an output actually landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    /// Final path of the written file.
    pub path: PathBuf,
    /// Set when the requested directory was not writable and the file was
    /// redirected to the system temp directory.
    pub fallback_reason: Option<String>,
}

/// Writes `bytes` to `requested`, redirecting to the system temp directory
/// (same file name) if the target directory cannot be written.
pub fn write_output(requested: &Path, bytes: &[u8], error_log: &ErrorLog) -> Result<WrittenOutput> {
    let dir = parent_dir(requested);
    // Missing parents surface through the probe below
    let _ = fs::create_dir_all(&dir);

    let (path, fallback_reason) = match probe_writable(&dir) {
        Ok(()) => (requested.to_path_buf(), None),
        Err(e) => {
            let file_name = requested
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output.wav"));
            let fallback = std::env::temp_dir().join(file_name);
            let reason = format!(
                "Cannot write to {} ({}), saving to {}",
                dir.display(),
                e,
                fallback.display()
            );
            error_log.record(format!("Write permission error: {}", reason));
            log::warn!("{}", reason);
            (fallback, Some(reason))
        }
    };

    if let Err(e) = fs::write(&path, bytes) {
        error_log.record(format!("Failed to save {}: {}", path.display(), e));
        return Err(e).with_context(|| format!("Failed to write output file: {}", path.display()));
    }

    Ok(WrittenOutput {
        path,
        fallback_reason,
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Creates and removes a probe file in `dir`.
fn probe_writable(dir: &Path) -> std::io::Result<()> {
    tempfile::Builder::new()
        .prefix(".wavjoin-probe-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_to_requested_path() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("out.wav");

        let written = write_output(&target, b"RIFF", &ErrorLog::disabled()).unwrap();
        assert_eq!(written.path, target);
        assert!(written.fallback_reason.is_none());
        assert_eq!(fs::read(&target).unwrap(), b"RIFF");

        // The probe file does not linger
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".wavjoin-probe-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_creates_missing_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested/dir/out.wav");

        let written = write_output(&target, b"data", &ErrorLog::disabled()).unwrap();
        assert_eq!(written.path, target);
        assert!(target.exists());
    }

    #[test]
    fn test_unwritable_parent_falls_back_to_temp() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file cannot act as a directory
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let name = format!("wavjoin-fallback-{}.wav", std::process::id());
        let target = blocker.join(&name);

        let log_path = tmp.path().join("logs.txt");
        let written = write_output(&target, b"data", &ErrorLog::to_file(&log_path)).unwrap();

        assert_eq!(written.path, std::env::temp_dir().join(&name));
        assert!(written.fallback_reason.is_some());
        assert!(fs::read_to_string(&log_path)
            .unwrap()
            .contains("Write permission error"));
        fs::remove_file(&written.path).unwrap();
    }

    #[test]
    fn test_parent_dir_of_bare_name() {
        assert_eq!(parent_dir(Path::new("out.wav")), PathBuf::from("."));
    }
}
