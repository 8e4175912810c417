//! Small shared helpers.
//!
//! This module provides:
//! - Error message sanitization for persisted task errors
//! - Panicking parsers for static CSS selectors and regexes
//! - Rounding and timing helpers for scores and execution times

pub mod sanitize;
mod selector;

use std::time::Duration;

pub use selector::{compile_regex_unsafe, parse_selector_unsafe};

/// Rounds to two decimal places (scores, execution times).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(64.285714), 64.29);
        assert_eq!(round2(90.6), 90.6);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(89.994), 89.99);
    }

    #[test]
    fn test_duration_to_ms() {
        assert_eq!(duration_to_ms(Duration::from_millis(1500)), 1500);
        assert_eq!(duration_to_ms(Duration::from_micros(999)), 0);
    }
}
