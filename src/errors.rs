/*!
 * Error types for the smisync application.
 *
 * `SyncError` is the tagged failure of the core pipeline (read, decode, resolve,
 * rewrite, write). `AppError` wraps it together with configuration problems for
 * the command-line front-end.
 */

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading, adjusting or writing a subtitle file
#[derive(Error, Debug)]
pub enum SyncError {
    /// None of the candidate encodings decoded the file cleanly
    #[error("Unable to detect the encoding of {path:?} (unsupported encoding)")]
    EncodingUnsupported {
        /// File that failed to decode
        path: PathBuf,
    },

    /// Source file does not exist
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    /// Source unreadable or destination unwritable
    #[error("Cannot access {path:?}: {message}")]
    FileAccess {
        /// Offending path
        path: PathBuf,
        /// Underlying reason
        message: String,
    },

    /// A caller-supplied time value is not a number
    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),

    /// The rewritten text cannot be represented in the detected encoding
    #[error("Text cannot be encoded as {encoding}")]
    Unencodable {
        /// Encoding label
        encoding: String,
    },

    /// Any other I/O failure
    #[error("Unexpected I/O error: {0}")]
    UnexpectedIo(String),
}

impl SyncError {
    /// Classify an I/O error that happened while touching `path`
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::FileAccess {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
            _ => Self::UnexpectedIo(format!("{:?}: {}", path, error)),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the adjustment pipeline
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<SyncError>() {
            Ok(sync_error) => Self::Sync(sync_error),
            Err(other) => Self::Unknown(other.to_string()),
        }
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::File(error.to_string())
    }
}
