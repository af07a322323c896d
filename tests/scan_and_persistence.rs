//! End-to-end scans across cache snapshots

use num_bigint::{BigInt, BigUint};
use tempfile::TempDir;

use tokio_util::sync::CancellationToken;

use collatz_scan::engine::{BaseConvention, MemoCache, SequenceLengthEngine};
use collatz_scan::errors::{CollatzError, PersistenceError};
use collatz_scan::persistence::CacheStore;
use collatz_scan::report::ScanReport;
use collatz_scan::scanner::{RangeScanner, ScanProgress, ScanRange, UpperBound};

fn store_in(dir: &TempDir) -> CacheStore {
    CacheStore::new(dir.path().join("data").join("collatz_memo.txt"))
}

#[test]
fn saved_cache_makes_rescans_free() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let range = ScanRange::inclusive(1, 1_000).unwrap();

    let mut cache = store.load_or_empty(BaseConvention::Transitions);
    assert_eq!(cache.len(), 1);
    let first = RangeScanner::new(&mut cache).scan(&range).unwrap();
    assert_eq!(first.argmax, BigUint::from(871u32));
    assert_eq!(first.max_length, 178);
    assert!(first.new_entries > 0);

    let saved = store.save(&cache).unwrap();
    assert_eq!(saved, cache.len());

    let mut reloaded = store.load_or_empty(BaseConvention::Transitions);
    assert_eq!(reloaded.len(), cache.len());
    let second = RangeScanner::new(&mut reloaded).scan(&range).unwrap();
    assert_eq!(second.argmax, first.argmax);
    assert_eq!(second.max_length, first.max_length);
    assert_eq!(second.new_entries, 0);
    assert_eq!(second.total_cached, first.total_cached);
}

/// Cancels the scan once `limit` values have been processed
struct StopAfter {
    limit: u64,
    seen: u64,
    token: CancellationToken,
}

impl ScanProgress for StopAfter {
    fn on_value(&mut self, _value: &BigUint, _length: u64) {
        self.seen += 1;
        if self.seen == self.limit {
            self.token.cancel();
        }
    }
}

#[test]
fn cache_saved_after_interruption_is_reusable() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let token = CancellationToken::new();
    let mut progress = StopAfter {
        limit: 500,
        seen: 0,
        token: token.clone(),
    };

    let mut cache = MemoCache::default();
    let err = RangeScanner::new(&mut cache)
        .scan_with(&ScanRange::inclusive(1, 100_000).unwrap(), &mut progress, &token)
        .unwrap_err();
    let CollatzError::InterruptedScan { scanned, partial } = err else {
        panic!("expected an interrupted scan");
    };
    assert_eq!(scanned, 500);
    let partial = partial.expect("partial result");
    assert_eq!(partial.last_scanned, BigUint::from(500u32));

    assert_eq!(store.save(&cache).unwrap(), cache.len());
    let mut reloaded = store.load_or_empty(BaseConvention::Transitions);
    assert_eq!(reloaded, cache);

    let prefix = ScanRange::inclusive(1, 500).unwrap();
    let rescan = RangeScanner::new(&mut reloaded).scan(&prefix).unwrap();
    assert_eq!(rescan.new_entries, 0);
    assert_eq!(rescan.argmax, partial.argmax);
    assert_eq!(rescan.max_length, partial.max_length);
    assert_eq!(rescan.argmax, BigUint::from(327u32));
    assert_eq!(rescan.max_length, 143);
}

#[test]
fn hand_written_terms_snapshot_is_honoured() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memo.txt");
    std::fs::write(
        &path,
        "collatz-memo 1\nconvention terms\nentries 3\n1 1\n2 2\n4 3\n",
    )
    .unwrap();

    let mut cache = CacheStore::new(&path).load_or_empty(BaseConvention::Terms);
    assert_eq!(cache.len(), 3);

    let length = SequenceLengthEngine::new(&mut cache)
        .length_of(&BigInt::from(4))
        .unwrap();
    assert_eq!(length, 3);
    assert_eq!(cache.len(), 3);
}

#[test]
fn snapshot_from_other_convention_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let mut terms = MemoCache::new(BaseConvention::Terms);
    RangeScanner::new(&mut terms)
        .scan(&ScanRange::inclusive(1, 50).unwrap())
        .unwrap();
    store.save(&terms).unwrap();

    let mut transitions = MemoCache::new(BaseConvention::Transitions);
    let err = store.load_into(&mut transitions).unwrap_err();
    assert!(matches!(err, PersistenceError::ConventionMismatch { .. }));
    assert_eq!(transitions.len(), 1);

    let degraded = store.load_or_empty(BaseConvention::Transitions);
    assert_eq!(degraded.len(), 1);
}

#[test]
fn growing_ranges_only_compute_new_values() {
    let mut cache = MemoCache::default();
    let small = RangeScanner::new(&mut cache)
        .scan(&ScanRange::inclusive(1, 100).unwrap())
        .unwrap();
    let large = RangeScanner::new(&mut cache)
        .scan(&ScanRange::inclusive(1, 200).unwrap())
        .unwrap();

    assert_eq!(small.argmax, BigUint::from(97u32));
    assert_eq!(small.max_length, 118);
    assert_eq!(large.argmax, BigUint::from(171u32));
    assert_eq!(large.max_length, 124);
    assert_eq!(large.total_cached, small.total_cached + large.new_entries);
}

#[test]
fn exclusive_range_stops_before_end() {
    let mut cache = MemoCache::default();
    let range = ScanRange::new(&BigInt::from(1), &BigInt::from(27), UpperBound::Exclusive).unwrap();
    let result = RangeScanner::new(&mut cache).scan(&range).unwrap();

    assert_eq!(result.last_scanned, BigUint::from(26u32));
    assert_eq!(result.argmax, BigUint::from(25u32));
    assert_eq!(result.max_length, 23);
}

#[test]
fn report_lists_every_scanned_value() {
    let dir = TempDir::new().unwrap();
    let mut cache = MemoCache::default();
    let result = RangeScanner::new(&mut cache)
        .scan(&ScanRange::inclusive(5, 8).unwrap())
        .unwrap();

    let path = ScanReport::new(&result, std::time::Duration::from_secs(75))
        .with_trajectory(true)
        .with_range_listing(&cache)
        .write_to_dir(dir.path())
        .unwrap();

    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains("Calculation completed in: 1 minutes and 15 seconds\n"));
    assert!(text.contains("The number with the maximum steps is: 7\n"));
    assert!(text.contains("Number of steps: 16\n"));
    assert!(text.ends_with("5: 5 steps\n6: 8 steps\n7: 16 steps\n8: 3 steps\n"));
}
