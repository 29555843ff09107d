//! Countdown formatting helpers

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Format milliseconds as `Hh Mm Ss`.
///
/// Hours are not wrapped into days; sub-second remainders are truncated.
pub fn format_remaining(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

/// Render a fixed-width text progress bar for a percentage in 0..=100
pub fn progress_bar(percent: f64, width: usize) -> String {
    let ratio = if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_remaining(0), "0h 0m 0s");
    }

    #[test]
    fn test_format_mixed_units() {
        assert_eq!(format_remaining(3_661_000), "1h 1m 1s");
        assert_eq!(format_remaining(2 * MS_PER_HOUR), "2h 0m 0s");
        assert_eq!(format_remaining(59_999), "0h 0m 59s");
    }

    #[test]
    fn test_format_does_not_wrap_days() {
        assert_eq!(format_remaining(24 * MS_PER_HOUR), "24h 0m 0s");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(50.0, 4), "[##--]");
        assert_eq!(progress_bar(100.0, 4), "[####]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
        assert_eq!(progress_bar(f64::NAN, 4), "[----]");
    }
}
