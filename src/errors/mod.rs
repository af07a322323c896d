//! Centralized error handling for the Collatz scanner
//!
//! Every fallible operation in the library returns one of the error types
//! defined in [`types`], so callers can tell input problems apart from
//! persistence problems and interrupted scans.
//!
//! # Error Categories
//!
//! - **Invalid arguments**: non-positive integers, empty ranges, unparsable input
//! - **Persistence failures**: unreadable, unwritable or malformed cache snapshots
//! - **Interrupted scans**: cancellation observed while a range scan was running
//!
//! # Usage
//!
//! ```rust
//! use collatz_scan::errors::{AppResult, CollatzError};
//!
//! fn checked(value: i64) -> AppResult<i64> {
//!     if value <= 0 {
//!         return Err(CollatzError::invalid_argument("value must be positive"));
//!     }
//!     Ok(value)
//! }
//! # assert!(checked(0).is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using CollatzError
pub type AppResult<T> = Result<T, CollatzError>;

/// Convenience type alias for snapshot load/save Results
pub type PersistenceResult<T> = Result<T, PersistenceError>;
