//! On-demand trajectory materialization
//!
//! The memo cache stores lengths, not paths, so trajectories are produced by
//! plain forward simulation. [`Trajectory`] is lazy and restartable (clone it
//! before consuming); [`TrajectorySummary`] keeps only the head and tail of a
//! long trajectory so it can be displayed without holding the whole path.

use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use crate::engine::{collatz_step, to_positive};
use crate::errors::{AppResult, CollatzError};

/// Separator used between trajectory values in displays and reports
pub const ARROW: &str = " → ";

/// Lazy iterator over the values from a starting integer down to 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    start: BigUint,
    next: Option<BigUint>,
}

impl Trajectory {
    pub fn new(start: &BigInt) -> AppResult<Self> {
        Self::from_positive(to_positive(start)?)
    }

    pub fn from_positive(start: BigUint) -> AppResult<Self> {
        if start.is_zero() {
            return Err(CollatzError::invalid_argument(
                "trajectory start must be >= 1, got 0",
            ));
        }
        Ok(Self {
            next: Some(start.clone()),
            start,
        })
    }

    pub fn start(&self) -> &BigUint {
        &self.start
    }

    /// A fresh iterator from the same starting value
    pub fn restart(&self) -> Self {
        Self {
            start: self.start.clone(),
            next: Some(self.start.clone()),
        }
    }

    /// Consume the trajectory, keeping the first and last `edge` values.
    pub fn summarize(self, edge: usize) -> TrajectorySummary {
        let start = self.start.clone();
        let mut head = Vec::with_capacity(edge);
        let mut tail = VecDeque::with_capacity(edge);
        let mut total = 0usize;

        for value in self {
            total += 1;
            if head.len() < edge {
                head.push(value);
                continue;
            }
            if edge == 0 {
                continue;
            }
            if tail.len() == edge {
                tail.pop_front();
            }
            tail.push_back(value);
        }

        TrajectorySummary {
            start,
            head,
            tail: tail.into(),
            total,
        }
    }
}

impl Iterator for Trajectory {
    type Item = BigUint;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !current.is_one() {
            self.next = Some(collatz_step(&current));
        }
        Some(current)
    }
}

impl FusedIterator for Trajectory {}

/// Head and tail of a trajectory plus its total number of values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectorySummary {
    start: BigUint,
    head: Vec<BigUint>,
    tail: Vec<BigUint>,
    total: usize,
}

impl TrajectorySummary {
    pub fn start(&self) -> &BigUint {
        &self.start
    }

    /// Number of values in the trajectory, the start and the final 1 included
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether values between the head and the tail were dropped
    pub fn is_truncated(&self) -> bool {
        self.head.len() + self.tail.len() < self.total
    }

    pub fn head(&self) -> &[BigUint] {
        &self.head
    }

    pub fn tail(&self) -> &[BigUint] {
        &self.tail
    }

    /// One-line heading matching the display
    pub fn caption(&self) -> String {
        if self.is_truncated() && self.head.is_empty() {
            format!("Sequence for {} ({} total):", self.start, self.total)
        } else if self.is_truncated() {
            format!(
                "Sequence for {} (showing first {} and last {} elements, {} total):",
                self.start,
                self.head.len(),
                self.tail.len(),
                self.total
            )
        } else {
            format!("Sequence for {}:", self.start)
        }
    }
}

impl fmt::Display for TrajectorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.head)?;
        if self.is_truncated() {
            if !self.head.is_empty() {
                f.write_str(ARROW)?;
            }
            f.write_str("...")?;
            if !self.tail.is_empty() {
                f.write_str(ARROW)?;
            }
        } else if !self.head.is_empty() && !self.tail.is_empty() {
            f.write_str(ARROW)?;
        }
        write_joined(f, &self.tail)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, values: &[BigUint]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(ARROW)?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

/// Write every value of the trajectory joined by arrows
pub fn write_full<W: std::io::Write>(out: &mut W, trajectory: Trajectory) -> std::io::Result<()> {
    for (i, value) in trajectory.enumerate() {
        if i > 0 {
            out.write_all(ARROW.as_bytes())?;
        }
        write!(out, "{}", value)?;
    }
    Ok(())
}
