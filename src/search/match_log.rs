//! Append-only, human-readable log of matches (`--log`).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{MboxError, Result};

/// Handle to the match log file.
///
/// Writers are serialized through a mutex and every record is flushed
/// immediately. The file is closed when the handle is dropped.
#[derive(Debug)]
pub struct MatchLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl MatchLog {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| MboxError::Log {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line announcing a match.
    pub fn record(&self, archive: &Path, ordinal: u64, subject: Option<&str>) -> Result<()> {
        let line = format_notice(archive, ordinal, subject);
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(file, "{line}")
            .and_then(|_| file.flush())
            .map_err(|source| MboxError::Log {
                path: self.path.clone(),
                source,
            })
    }
}

/// The notice written for each match, without a trailing newline.
pub fn format_notice(archive: &Path, ordinal: u64, subject: Option<&str>) -> String {
    format!(
        "Match found in message {ordinal} from {}: {}",
        archive.display(),
        subject.unwrap_or("(no subject)")
    )
}
