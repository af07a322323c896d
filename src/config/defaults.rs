/// Configuration default values
///
/// All default values for configuration options live here so they can be
/// changed in one place.
use super::Decision;
use crate::engine::BaseConvention;
use crate::scanner::UpperBound;

// Engine defaults
pub const DEFAULT_BASE_CONVENTION: BaseConvention = BaseConvention::Transitions;

// Scan defaults
pub const DEFAULT_UPPER_BOUND: UpperBound = UpperBound::Inclusive;
pub const DEFAULT_PROGRESS_UPDATE_INTERVAL: u64 = 100_000;

// Cache defaults
pub const DEFAULT_CACHE_PATH: &str = "./data/collatz_memo.txt";
pub const DEFAULT_LOAD_ON_START: bool = true;
pub const DEFAULT_SAVE_CACHE: Decision = Decision::Ask;

// Report defaults
pub const DEFAULT_REPORT_DIRECTORY: &str = ".";
pub const DEFAULT_WRITE_REPORT: Decision = Decision::Ask;
pub const DEFAULT_INCLUDE_TRAJECTORY: bool = true;
pub const DEFAULT_INCLUDE_RANGE_LISTING: Decision = Decision::Ask;
pub const DEFAULT_SHOW_TRAJECTORY: Decision = Decision::Ask;
pub const DEFAULT_TRAJECTORY_EDGE: usize = 10;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "COLLATZ_";
