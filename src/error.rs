//! Error types for accdev
//!
//! Uses `thiserror` for library errors; the binary boundary wraps these
//! with `anyhow` for display.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for accdev operations
pub type AccdevResult<T> = Result<T, AccdevError>;

/// Main error type for accdev operations
#[derive(Error, Debug)]
pub enum AccdevError {
    /// Source file or database file does not exist
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Target directory does not exist
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Database is open in another process (lock marker or open handle)
    #[error("database in use: {path} - close it in other applications and retry")]
    Locked { path: PathBuf },

    /// Recoverable I/O failure during a replacement; eligible for retry
    #[error("transient I/O failure on {path}: {message}")]
    TransientIo { path: PathBuf, message: String },

    /// Unrecoverable per-target failure; surfaced in the summary, never retried
    #[error("unrecoverable failure on {path}: {message}")]
    FatalIo { path: PathBuf, message: String },

    /// Automation or ODBC collaborator reported a failure
    #[error("{operation} failed: {message}")]
    Upstream { operation: String, message: String },

    /// Configuration file could not be parsed
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Run was aborted by the user before any work started
    #[error("aborted by user")]
    Aborted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
