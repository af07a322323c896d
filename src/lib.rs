pub mod config;
pub mod engine;
pub mod errors;
pub mod persistence;
pub mod report;
pub mod scanner;
pub mod session;
pub mod trajectory;
pub mod utils;

pub use engine::{BaseConvention, MemoCache, SequenceLengthEngine};
pub use errors::{AppResult, CollatzError, PersistenceError};
pub use scanner::{RangeScanner, ScanRange, ScanResult, UpperBound};
