//! Human-readable formatting for elapsed wall-clock time

use std::time::Duration;

/// Formats an elapsed duration the way scan summaries print it.
///
/// - under a minute: `"12.34 seconds"`
/// - under an hour: `"3 minutes and 5 seconds"`
/// - otherwise: `"2 hours, 0 minutes and 7 seconds"`
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds < 60.0 {
        return format!("{:.2} seconds", seconds);
    }

    let total_seconds = elapsed.as_secs();
    if total_seconds < 3600 {
        let minutes = total_seconds / 60;
        let secs = total_seconds % 60;
        format!("{} minutes and {} seconds", minutes, secs)
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let secs = total_seconds % 60;
        format!("{} hours, {} minutes and {} seconds", hours, minutes, secs)
    }
}
