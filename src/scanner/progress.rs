//! Progress hooks for long range scans
//!
//! A scan calls [`ScanProgress::on_value`] once per starting value. Hooks
//! only observe; removing one never changes the scan order or its result.

use std::time::Instant;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use tracing::{debug, info};

use super::{ScanRange, ScanResult};
use crate::utils::human_format::format_elapsed;

/// Observer invoked by [`RangeScanner::scan_with`](super::RangeScanner::scan_with)
pub trait ScanProgress {
    fn on_start(&mut self, _range: &ScanRange) {}

    fn on_value(&mut self, value: &BigUint, length: u64);

    fn on_finish(&mut self, _result: &ScanResult) {}
}

/// Progress hook that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn on_value(&mut self, _value: &BigUint, _length: u64) {}
}

/// Logs a progress line every `interval` values through `tracing`.
#[derive(Debug)]
pub struct LoggingProgress {
    interval: u64,
    processed: u64,
    total: Option<u64>,
    started: Option<Instant>,
}

impl LoggingProgress {
    /// An `interval` of 0 disables the periodic lines.
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            processed: 0,
            total: None,
            started: None,
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Percentage of the range processed so far, if the range size fits in u64
    pub fn percent(&self) -> Option<f64> {
        self.total
            .filter(|total| *total > 0)
            .map(|total| self.processed as f64 * 100.0 / total as f64)
    }
}

impl ScanProgress for LoggingProgress {
    fn on_start(&mut self, range: &ScanRange) {
        self.processed = 0;
        self.total = range.len().to_u64();
        self.started = Some(Instant::now());
        match self.total {
            Some(total) => info!("Checking {} ({} values)", range, total),
            None => info!("Checking {}", range),
        }
    }

    fn on_value(&mut self, value: &BigUint, _length: u64) {
        self.processed += 1;
        if self.interval == 0 || self.processed % self.interval != 0 {
            return;
        }

        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        let rate = self.processed as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        match self.percent() {
            Some(percent) => info!(
                "Progress: {}/{} ({:.1}%) at {}, {:.0} num/s",
                self.processed,
                self.total.unwrap_or_default(),
                percent,
                value,
                rate
            ),
            None => info!(
                "Progress: {} values at {}, {:.0} num/s",
                self.processed, value, rate
            ),
        }
    }

    fn on_finish(&mut self, result: &ScanResult) {
        if let Some(started) = self.started {
            debug!(
                "Checked {} values in {}",
                result.scanned,
                format_elapsed(started.elapsed())
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoCache;
    use crate::scanner::RangeScanner;
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Recorder {
        values: Vec<(BigUint, u64)>,
        started: bool,
        finished: bool,
    }

    impl ScanProgress for Recorder {
        fn on_start(&mut self, _range: &ScanRange) {
            self.started = true;
        }

        fn on_value(&mut self, value: &BigUint, length: u64) {
            self.values.push((value.clone(), length));
        }

        fn on_finish(&mut self, _result: &ScanResult) {
            self.finished = true;
        }
    }

    #[test]
    fn hook_sees_every_value_in_order() {
        let mut cache = MemoCache::default();
        let range = ScanRange::inclusive(5, 9).unwrap();
        let mut recorder = Recorder::default();
        RangeScanner::new(&mut cache)
            .scan_with(&range, &mut recorder, &CancellationToken::new())
            .unwrap();

        assert!(recorder.started && recorder.finished);
        let values: Vec<u64> = recorder
            .values
            .iter()
            .map(|(v, _)| v.to_u64().unwrap())
            .collect();
        assert_eq!(values, vec![5, 6, 7, 8, 9]);
        assert_eq!(recorder.values[4].1, 19);
    }

    #[test]
    fn progress_hook_does_not_change_result() {
        let range = ScanRange::inclusive(1, 300).unwrap();

        let mut plain_cache = MemoCache::default();
        let plain = RangeScanner::new(&mut plain_cache).scan(&range).unwrap();

        let mut observed_cache = MemoCache::default();
        let mut progress = LoggingProgress::new(7);
        let observed = RangeScanner::new(&mut observed_cache)
            .scan_with(&range, &mut progress, &CancellationToken::new())
            .unwrap();

        assert_eq!(plain, observed);
        assert_eq!(plain_cache, observed_cache);
        assert_eq!(progress.processed(), 300);
        assert_eq!(progress.percent(), Some(100.0));
    }

    #[test]
    #[traced_test]
    fn logging_progress_emits_periodic_lines() {
        let mut cache = MemoCache::default();
        let range = ScanRange::inclusive(1, 20).unwrap();
        let mut progress = LoggingProgress::new(10);
        RangeScanner::new(&mut cache)
            .scan_with(&range, &mut progress, &CancellationToken::new())
            .unwrap();

        assert!(logs_contain("Progress: 10/20 (50.0%)"));
        assert!(logs_contain("Progress: 20/20 (100.0%)"));
    }
}
