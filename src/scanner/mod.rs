//! Range scanning for the longest Collatz trajectory
//!
//! [`RangeScanner`] walks a [`ScanRange`] in increasing order, asks the
//! engine for each length and keeps the first value that reaches the maximum
//! (only strictly greater lengths replace the running maximum).

pub mod progress;

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint};
use num_traits::One;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::{BaseConvention, MemoCache, SequenceLengthEngine, to_positive};
use crate::errors::{AppResult, CollatzError};

pub use progress::{LoggingProgress, NoProgress, ScanProgress};

/// Whether the end of a range is part of the scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpperBound {
    #[default]
    Inclusive,
    Exclusive,
}

impl UpperBound {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inclusive => "inclusive",
            Self::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for UpperBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpperBound {
    type Err = CollatzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inclusive" => Ok(Self::Inclusive),
            "exclusive" => Ok(Self::Exclusive),
            other => Err(CollatzError::invalid_argument(format!(
                "unknown upper bound '{other}' (expected 'inclusive' or 'exclusive')"
            ))),
        }
    }
}

/// A validated, non-empty range of positive starting values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRange {
    start: BigUint,
    end: BigUint,
    upper_bound: UpperBound,
}

impl ScanRange {
    /// Validate `start` and `end`.
    ///
    /// Both must be positive; `start <= end` for inclusive ranges and
    /// `start < end` for exclusive ones.
    pub fn new(start: &BigInt, end: &BigInt, upper_bound: UpperBound) -> AppResult<Self> {
        let start = to_positive(start).map_err(|_| {
            CollatzError::invalid_argument(format!("range start must be >= 1, got {start}"))
        })?;
        let end = to_positive(end).map_err(|_| {
            CollatzError::invalid_argument(format!("range end must be >= 1, got {end}"))
        })?;

        let empty = match upper_bound {
            UpperBound::Inclusive => start > end,
            UpperBound::Exclusive => start >= end,
        };
        if empty {
            let relation = match upper_bound {
                UpperBound::Inclusive => "less than or equal to",
                UpperBound::Exclusive => "less than",
            };
            return Err(CollatzError::invalid_argument(format!(
                "range start ({start}) must be {relation} range end ({end}) for an {upper_bound} range"
            )));
        }

        Ok(Self {
            start,
            end,
            upper_bound,
        })
    }

    /// Inclusive range from plain integers
    pub fn inclusive(start: u64, end: u64) -> AppResult<Self> {
        Self::new(&BigInt::from(start), &BigInt::from(end), UpperBound::Inclusive)
    }

    /// Exclusive range from plain integers
    pub fn exclusive(start: u64, end: u64) -> AppResult<Self> {
        Self::new(&BigInt::from(start), &BigInt::from(end), UpperBound::Exclusive)
    }

    pub fn start(&self) -> &BigUint {
        &self.start
    }

    pub fn end(&self) -> &BigUint {
        &self.end
    }

    pub fn upper_bound(&self) -> UpperBound {
        self.upper_bound
    }

    /// Largest value that is actually scanned
    pub fn last(&self) -> BigUint {
        match self.upper_bound {
            UpperBound::Inclusive => self.end.clone(),
            UpperBound::Exclusive => &self.end - 1u32,
        }
    }

    pub fn contains(&self, value: &BigUint) -> bool {
        match self.upper_bound {
            UpperBound::Inclusive => *value >= self.start && *value <= self.end,
            UpperBound::Exclusive => *value >= self.start && *value < self.end,
        }
    }

    /// Number of values in the range
    pub fn len(&self) -> BigUint {
        self.last() - &self.start + 1u32
    }

    /// Always false: empty ranges are rejected on construction
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Values of the range in increasing order
    pub fn values(&self) -> RangeValues {
        RangeValues {
            next: Some(self.start.clone()),
            last: self.last(),
        }
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let close = match self.upper_bound {
            UpperBound::Inclusive => ']',
            UpperBound::Exclusive => ')',
        };
        write!(f, "[{}, {}{}", self.start, self.end, close)
    }
}

/// Iterator over the values of a [`ScanRange`]
#[derive(Debug, Clone)]
pub struct RangeValues {
    next: Option<BigUint>,
    last: BigUint,
}

impl Iterator for RangeValues {
    type Item = BigUint;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current < self.last {
            self.next = Some(&current + BigUint::one());
        }
        Some(current)
    }
}

impl std::iter::FusedIterator for RangeValues {}

/// Outcome of a range scan (or of the scanned prefix of an interrupted one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub range: ScanRange,
    /// Length convention of the cache the scan ran against
    pub convention: BaseConvention,
    /// First value reaching the maximum length
    pub argmax: BigUint,
    pub max_length: u64,
    /// Number of starting values processed
    pub scanned: u64,
    /// Last starting value processed
    pub last_scanned: BigUint,
    /// Cache entries created by this scan
    pub new_entries: usize,
    /// Cache size after the scan
    pub total_cached: usize,
}

/// Drives the engine over a range, sharing one memo cache across calls.
pub struct RangeScanner<'a> {
    cache: &'a mut MemoCache,
}

impl<'a> RangeScanner<'a> {
    pub fn new(cache: &'a mut MemoCache) -> Self {
        Self { cache }
    }

    /// Scan without progress reporting or cancellation.
    pub fn scan(&mut self, range: &ScanRange) -> AppResult<ScanResult> {
        self.scan_with(range, &mut NoProgress, &CancellationToken::new())
    }

    /// Scan `range`, reporting each value to `progress`.
    ///
    /// The token is checked before every value. On cancellation the scan
    /// stops with [`CollatzError::InterruptedScan`], carrying the result over
    /// the values already processed.
    pub fn scan_with(
        &mut self,
        range: &ScanRange,
        progress: &mut dyn ScanProgress,
        cancel: &CancellationToken,
    ) -> AppResult<ScanResult> {
        let initial_size = self.cache.len();
        let mut best: Option<(BigUint, u64)> = None;
        let mut last_scanned: Option<BigUint> = None;
        let mut scanned: u64 = 0;

        info!("Scanning {} for the longest Collatz trajectory", range);
        progress.on_start(range);

        for value in range.values() {
            if cancel.is_cancelled() {
                warn!("Scan of {} cancelled after {} values", range, scanned);
                let partial = best.zip(last_scanned).map(|((argmax, max_length), last)| {
                    Box::new(self.result(range, argmax, max_length, scanned, last, initial_size))
                });
                return Err(CollatzError::InterruptedScan { scanned, partial });
            }

            let length = SequenceLengthEngine::new(&mut *self.cache).length_of_positive(&value)?;
            progress.on_value(&value, length);

            if best.as_ref().is_none_or(|(_, max_length)| length > *max_length) {
                debug!(value = %value, length, "new maximum");
                best = Some((value.clone(), length));
            }
            scanned += 1;
            last_scanned = Some(value);
        }

        let ((argmax, max_length), last) = best
            .zip(last_scanned)
            .ok_or_else(|| CollatzError::invalid_argument(format!("range {range} is empty")))?;
        let result = self.result(range, argmax, max_length, scanned, last, initial_size);

        info!(
            "Scan of {} finished: {} has {} steps ({} new cache entries, {} total)",
            range, result.argmax, result.max_length, result.new_entries, result.total_cached
        );
        progress.on_finish(&result);
        Ok(result)
    }

    fn result(
        &self,
        range: &ScanRange,
        argmax: BigUint,
        max_length: u64,
        scanned: u64,
        last_scanned: BigUint,
        initial_size: usize,
    ) -> ScanResult {
        ScanResult {
            range: range.clone(),
            convention: self.cache.convention(),
            argmax,
            max_length,
            scanned,
            last_scanned,
            new_entries: self.cache.len() - initial_size,
            total_cached: self.cache.len(),
        }
    }
}
