//! Error type definitions for the Collatz scanner

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::BaseConvention;
use crate::scanner::ScanResult;

/// Top-level error type
///
/// Input validation failures are raised before any scanning starts. A scan
/// that observes cancellation returns [`CollatzError::InterruptedScan`] with
/// whatever it had computed so far; the cache entries produced up to that
/// point remain valid.
#[derive(Error, Debug)]
pub enum CollatzError {
    /// Non-positive integers, empty ranges or unparsable input
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Cache snapshot could not be read or written
    #[error("Persistence failure: {0}")]
    Persistence(#[from] PersistenceError),

    /// Cancellation observed during a range scan
    #[error("Scan interrupted after {scanned} values")]
    InterruptedScan {
        scanned: u64,
        partial: Option<Box<ScanResult>>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Terminal or report I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cache snapshot specific errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Reading or writing the snapshot file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file does not start with the snapshot header
    #[error("Unsupported snapshot format: {found:?}")]
    UnsupportedFormat { found: String },

    /// The snapshot was written by a newer or older format revision
    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// The snapshot was produced under a different base-case convention
    #[error("Convention mismatch: snapshot uses {found}, cache uses {expected}")]
    ConventionMismatch {
        found: BaseConvention,
        expected: BaseConvention,
    },

    /// A header or entry line could not be parsed
    #[error("Malformed snapshot at line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// Fewer entry lines than the header announced
    #[error("Snapshot truncated: expected {expected} entries, found {found}")]
    Truncated { expected: usize, found: usize },
}

impl CollatzError {
    /// Create an invalid argument error with a custom message
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error was caused by bad user input
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

impl PersistenceError {
    /// Create an I/O error bound to the snapshot path
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed-line error
    pub fn malformed<S: Into<String>>(line: usize, message: S) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }

    /// Whether the snapshot file simply does not exist yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
