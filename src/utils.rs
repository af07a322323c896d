//! Utility modules for the Collatz scanner
//!
//! Small helpers shared by the binary and the report writer.

pub mod human_format;

pub use human_format::format_elapsed;
