//! Append-only memo cache of sequence lengths

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::errors::CollatzError;

/// How the length of the trivial trajectory `[1]` is counted.
///
/// `Transitions` counts map applications, so `1` has length 0 and `9` has
/// length 19. `Terms` counts values in the trajectory, so every length is one
/// larger. A cache is created with one convention and keeps it for life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseConvention {
    #[default]
    Transitions,
    Terms,
}

impl BaseConvention {
    /// Length assigned to the value 1
    pub const fn base_length(self) -> u64 {
        match self {
            Self::Transitions => 0,
            Self::Terms => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transitions => "transitions",
            Self::Terms => "terms",
        }
    }
}

impl fmt::Display for BaseConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseConvention {
    type Err = CollatzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transitions" | "steps" => Ok(Self::Transitions),
            "terms" | "values" => Ok(Self::Terms),
            other => Err(CollatzError::invalid_argument(format!(
                "unknown base convention '{other}' (expected 'transitions' or 'terms')"
            ))),
        }
    }
}

/// Mapping from visited integer to its sequence length.
///
/// Entries are only ever added with insert-if-absent semantics, so a value
/// once stored is never changed for the lifetime of the cache. The base key
/// 1 is present from construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoCache {
    convention: BaseConvention,
    lengths: HashMap<BigUint, u64>,
}

impl MemoCache {
    pub fn new(convention: BaseConvention) -> Self {
        let mut lengths = HashMap::new();
        lengths.insert(BigUint::one(), convention.base_length());
        Self {
            convention,
            lengths,
        }
    }

    pub fn convention(&self) -> BaseConvention {
        self.convention
    }

    pub fn get(&self, value: &BigUint) -> Option<u64> {
        self.lengths.get(value).copied()
    }

    pub fn contains(&self, value: &BigUint) -> bool {
        self.lengths.contains_key(value)
    }

    /// Number of cached values, the base entry included
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Always false: the base entry is inserted on construction
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Insert `value -> length` unless `value` is already cached.
    ///
    /// Returns true when a new entry was created.
    pub fn insert_if_absent(&mut self, value: BigUint, length: u64) -> bool {
        match self.lengths.entry(value) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(length);
                true
            }
        }
    }

    /// Merge trusted entries (e.g. from a snapshot) and return how many were new.
    pub fn merge<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (BigUint, u64)>,
    {
        let mut added = 0;
        for (value, length) in entries {
            if self.insert_if_absent(value, length) {
                added += 1;
            }
        }
        added
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BigUint, u64)> {
        self.lengths.iter().map(|(value, length)| (value, *length))
    }

    /// All entries in ascending key order
    pub fn sorted_entries(&self) -> Vec<(&BigUint, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new(BaseConvention::default())
    }
}
