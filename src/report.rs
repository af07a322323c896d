//! Plain-text export of a scan result

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::engine::MemoCache;
use crate::errors::AppResult;
use crate::scanner::ScanResult;
use crate::trajectory::{self, Trajectory};
use crate::utils::format_elapsed;

/// Text report for one scan.
///
/// The trajectory of the arg-max and the per-value listing are optional;
/// the listing only covers values of the range that were actually scanned.
pub struct ScanReport<'a> {
    result: &'a ScanResult,
    elapsed: Duration,
    include_trajectory: bool,
    range_listing: Option<&'a MemoCache>,
}

impl<'a> ScanReport<'a> {
    pub fn new(result: &'a ScanResult, elapsed: Duration) -> Self {
        Self {
            result,
            elapsed,
            include_trajectory: false,
            range_listing: None,
        }
    }

    pub fn with_trajectory(mut self, include: bool) -> Self {
        self.include_trajectory = include;
        self
    }

    /// List `value: length steps` for every scanned value, read from `cache`
    pub fn with_range_listing(mut self, cache: &'a MemoCache) -> Self {
        self.range_listing = Some(cache);
        self
    }

    /// `collatz_results_{start}_to_{end}.txt`
    pub fn file_name(&self) -> String {
        format!(
            "collatz_results_{}_to_{}.txt",
            self.result.range.start(),
            self.result.range.end()
        )
    }

    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let result = self.result;
        let range = &result.range;

        writeln!(
            out,
            "Collatz Conjecture Results for range {} to {} ({})",
            range.start(),
            range.end(),
            range.upper_bound()
        )?;
        writeln!(
            out,
            "Generated: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(out, "Length convention: {}", result.convention)?;
        writeln!(out, "The number with the maximum steps is: {}", result.argmax)?;
        writeln!(out, "Number of steps: {}", result.max_length)?;
        writeln!(out, "Calculation completed in: {}", format_elapsed(self.elapsed))?;
        writeln!(out, "Values checked: {}", result.scanned)?;
        writeln!(out, "New calculations: {}", result.new_entries)?;
        writeln!(out, "Total cached results: {}", result.total_cached)?;

        if self.include_trajectory {
            writeln!(out)?;
            writeln!(out, "Sequence for {}:", result.argmax)?;
            let path = Trajectory::from_positive(result.argmax.clone())
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
            trajectory::write_full(out, path)?;
            writeln!(out)?;
        }

        if let Some(cache) = self.range_listing {
            writeln!(out)?;
            writeln!(out, "Detailed results for all numbers in range:")?;
            for value in range.values() {
                if value > result.last_scanned {
                    break;
                }
                if let Some(length) = cache.get(&value) {
                    writeln!(out, "{}: {} steps", value, length)?;
                }
            }
        }

        Ok(())
    }

    /// Write the report into `directory`, creating it if needed.
    pub fn write_to_dir(&self, directory: &Path) -> AppResult<PathBuf> {
        fs::create_dir_all(directory)?;
        let path = directory.join(self.file_name());
        let mut writer = BufWriter::new(fs::File::create(&path)?);
        self.render(&mut writer)?;
        writer.flush()?;
        info!("Results saved to {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BaseConvention;
    use crate::scanner::{RangeScanner, ScanRange};
    use tempfile::TempDir;

    fn scanned(start: u64, end: u64) -> (MemoCache, ScanResult) {
        let mut cache = MemoCache::new(BaseConvention::Transitions);
        let range = ScanRange::inclusive(start, end).unwrap();
        let result = RangeScanner::new(&mut cache).scan(&range).unwrap();
        (cache, result)
    }

    fn render(report: &ScanReport<'_>) -> String {
        let mut out = Vec::new();
        report.render(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn summary_lines_are_always_present() {
        let (_, result) = scanned(1, 10);
        let text = render(&ScanReport::new(&result, Duration::from_millis(1250)));

        assert!(text.starts_with("Collatz Conjecture Results for range 1 to 10 (inclusive)\n"));
        assert!(text.contains("The number with the maximum steps is: 9\n"));
        assert!(text.contains("Number of steps: 19\n"));
        assert!(text.contains("Calculation completed in: 1.25 seconds\n"));
        assert!(text.contains(&format!("Total cached results: {}\n", result.total_cached)));
        assert!(!text.contains("Sequence for"));
        assert!(!text.contains("Detailed results"));
    }

    #[test]
    fn trajectory_and_listing_are_optional_sections() {
        let (cache, result) = scanned(1, 10);
        let text = render(
            &ScanReport::new(&result, Duration::ZERO)
                .with_trajectory(true)
                .with_range_listing(&cache),
        );

        assert!(text.contains("Length convention: transitions\n"));
        assert!(text.contains("Sequence for 9:\n9 → 28 → 14"));
        assert!(text.contains("→ 4 → 2 → 1\n"));
        assert!(text.contains("Detailed results for all numbers in range:\n1: 0 steps\n2: 1 steps\n"));
        assert!(text.ends_with("9: 19 steps\n10: 6 steps\n"));
    }

    #[test]
    fn report_file_is_named_after_the_range() {
        let dir = TempDir::new().unwrap();
        let (_, result) = scanned(3, 30);
        let report = ScanReport::new(&result, Duration::from_secs(2));
        let path = report.write_to_dir(&dir.path().join("reports")).unwrap();

        assert_eq!(path.file_name().unwrap(), "collatz_results_3_to_30.txt");
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("The number with the maximum steps is: 27"));
    }
}
