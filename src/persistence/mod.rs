//! Cache snapshots on disk
//!
//! Snapshot format, version 1 (UTF-8 text, one record per line):
//!
//! ```text
//! collatz-memo 1
//! convention transitions
//! entries 3
//! 1 0
//! 2 1
//! 4 2
//! ```
//!
//! The `entries` line announces how many `<value> <length>` records follow;
//! records are written in ascending value order. A snapshot is parsed in
//! full before anything is merged, so a bad file never leaves half of its
//! entries in the cache.

use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, info, warn};

use crate::engine::{BaseConvention, MemoCache};
use crate::errors::{PersistenceError, PersistenceResult};

pub const FORMAT_NAME: &str = "collatz-memo";
pub const FORMAT_VERSION: u32 = 1;

const MAX_PREALLOCATED_ENTRIES: usize = 1 << 16;

/// Parsed contents of a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub convention: BaseConvention,
    pub entries: Vec<(BigUint, u64)>,
}

/// Write `cache` in snapshot format.
pub fn write_snapshot<W: Write>(cache: &MemoCache, out: &mut W) -> std::io::Result<()> {
    let entries = cache.sorted_entries();
    writeln!(out, "{} {}", FORMAT_NAME, FORMAT_VERSION)?;
    writeln!(out, "convention {}", cache.convention())?;
    writeln!(out, "entries {}", entries.len())?;
    for (value, length) in entries {
        writeln!(out, "{} {}", value, length)?;
    }
    Ok(())
}

/// Parse a snapshot. `path` is only used for error reporting.
pub fn read_snapshot<R: BufRead>(input: R, path: &Path) -> PersistenceResult<Snapshot> {
    let mut lines = input.lines().enumerate().map(|(i, line)| {
        line.map(|text| (i + 1, text))
            .map_err(|e| PersistenceError::io(path, e))
    });

    let mut header = |expected: &str| -> PersistenceResult<(usize, String)> {
        match lines.next() {
            Some(line) => line,
            None => Err(PersistenceError::malformed(0, format!("missing '{expected}' line"))),
        }
    };

    let (_, magic) = header(FORMAT_NAME)?;
    let version = match magic.split_once(' ') {
        Some((name, version)) if name == FORMAT_NAME => version,
        _ => return Err(PersistenceError::UnsupportedFormat { found: magic.clone() }),
    };
    let version: u32 = version
        .trim()
        .parse()
        .map_err(|_| PersistenceError::malformed(1, format!("bad version '{version}'")))?;
    if version != FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let (line_no, convention_line) = header("convention")?;
    let convention = keyed_value(line_no, &convention_line, "convention")?
        .parse::<BaseConvention>()
        .map_err(|e| PersistenceError::malformed(line_no, e.to_string()))?;

    let (line_no, count_line) = header("entries")?;
    let expected: usize = keyed_value(line_no, &count_line, "entries")?
        .parse()
        .map_err(|_| PersistenceError::malformed(line_no, "entry count is not a number"))?;

    // Count is read from the file and may be anything
    let mut entries = Vec::with_capacity(expected.min(MAX_PREALLOCATED_ENTRIES));
    for line in lines {
        let (line_no, text) = line?;
        let text = text.trim();
        if entries.len() == expected {
            if text.is_empty() {
                continue;
            }
            return Err(PersistenceError::malformed(
                line_no,
                format!("unexpected content after {expected} entries"),
            ));
        }
        entries.push(parse_entry(line_no, text)?);
    }

    if entries.len() != expected {
        return Err(PersistenceError::Truncated {
            expected,
            found: entries.len(),
        });
    }

    Ok(Snapshot {
        convention,
        entries,
    })
}

fn keyed_value<'a>(line_no: usize, line: &'a str, key: &str) -> PersistenceResult<&'a str> {
    match line.trim().split_once(' ') {
        Some((found, value)) if found == key => Ok(value.trim()),
        _ => Err(PersistenceError::malformed(
            line_no,
            format!("expected '{key} <value>', found '{line}'"),
        )),
    }
}

fn parse_entry(line_no: usize, text: &str) -> PersistenceResult<(BigUint, u64)> {
    let mut fields = text.split_whitespace();
    let (Some(value), Some(length), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(PersistenceError::malformed(
            line_no,
            format!("expected '<value> <length>', found '{text}'"),
        ));
    };
    let value: BigUint = value
        .parse()
        .map_err(|_| PersistenceError::malformed(line_no, format!("bad value '{value}'")))?;
    if value.is_zero() {
        return Err(PersistenceError::malformed(line_no, "value must be positive"));
    }
    let length: u64 = length
        .parse()
        .map_err(|_| PersistenceError::malformed(line_no, format!("bad length '{length}'")))?;
    Ok((value, length))
}

/// File-backed store for one memo cache snapshot
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the snapshot without touching any cache.
    pub fn read(&self) -> PersistenceResult<Snapshot> {
        let file = fs::File::open(&self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
        read_snapshot(BufReader::new(file), &self.path)
    }

    /// Merge the snapshot into `cache`, returning how many entries were new.
    ///
    /// Snapshots written under another convention are rejected.
    pub fn load_into(&self, cache: &mut MemoCache) -> PersistenceResult<usize> {
        let snapshot = self.read()?;
        if snapshot.convention != cache.convention() {
            return Err(PersistenceError::ConventionMismatch {
                found: snapshot.convention,
                expected: cache.convention(),
            });
        }
        let total = snapshot.entries.len();
        let added = cache.merge(snapshot.entries);
        debug!("Merged {} of {} snapshot entries", added, total);
        Ok(added)
    }

    /// Build a cache from the snapshot, degrading to an empty cache on failure.
    pub fn load_or_empty(&self, convention: BaseConvention) -> MemoCache {
        let mut cache = MemoCache::new(convention);
        match self.load_into(&mut cache) {
            Ok(added) => {
                info!(
                    "Loaded {} pre-calculated results from {:?}",
                    added, self.path
                );
                cache
            }
            Err(e) if e.is_not_found() => {
                info!("No cache snapshot at {:?}, starting empty", self.path);
                cache
            }
            Err(e) => {
                warn!("Error loading cache snapshot, starting empty: {}", e);
                MemoCache::new(convention)
            }
        }
    }

    /// Atomically replace the snapshot with the full contents of `cache`.
    ///
    /// Returns the number of entries written.
    pub fn save(&self, cache: &MemoCache) -> PersistenceResult<usize> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| PersistenceError::io(&parent, e))?;

        let temp = tempfile::NamedTempFile::new_in(&parent)
            .map_err(|e| PersistenceError::io(&parent, e))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            write_snapshot(cache, &mut writer).map_err(|e| PersistenceError::io(&self.path, e))?;
            writer.flush().map_err(|e| PersistenceError::io(&self.path, e))?;
        }
        temp.persist(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e.error))?;

        info!(
            "Saved {} calculated results to {:?} for future use",
            cache.len(),
            self.path
        );
        Ok(cache.len())
    }
}
