//! Centralized error types for mboxsearch.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mboxsearch library.
///
/// Everything except [`MboxError::InvalidRoot`] is recoverable: the scan
/// logs it and moves on to the next message or archive.
#[derive(Error, Debug)]
pub enum MboxError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The scan root does not exist or is not readable.
    #[error("Mailbox directory not found: {0}")]
    InvalidRoot(PathBuf),

    /// A raw message could not be decoded into headers and body.
    #[error("Could not decode message {ordinal}: {reason}")]
    Decode { ordinal: u64, reason: String },

    /// No archive holds a message at the requested ordinal.
    #[error("Message with index {ordinal} not found")]
    MessageNotFound { ordinal: u64 },

    /// A search keyword could not be turned into a pattern.
    #[error("Invalid search term '{keyword}': {reason}")]
    InvalidTerm { keyword: String, reason: String },

    /// A log sink could not be written.
    #[error("Could not write match log '{path}': {source}")]
    Log {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, MboxError>`.
pub type Result<T> = std::result::Result<T, MboxError>;

impl MboxError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `Decode` variant for the message at `ordinal`.
    pub fn decode(ordinal: u64, reason: impl Into<String>) -> Self {
        Self::Decode {
            ordinal,
            reason: reason.into(),
        }
    }
}
