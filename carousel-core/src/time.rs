//! Time and duration conversion utilities.
//!
//! Durations are kept as [`Duration`] throughout the crate; these helpers
//! cover the places where a float seconds value crosses a boundary
//! (config files, media elements reporting `currentTime`).

use std::time::Duration;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Build a duration from float seconds, mapping negative, NaN and
    /// infinite inputs to [`Duration::ZERO`].
    fn from_secs_f64_lossy(secs: f64) -> Self;
}

impl DurationExt for Duration {
    fn from_secs_f64_lossy(secs: f64) -> Self {
        Self::try_from_secs_f64(secs).unwrap_or(Self::ZERO)
    }
}

/// Convert a tick rate in hertz into the interval between ticks.
///
/// A rate of zero is treated as one tick per second.
#[must_use]
pub fn tick_interval(tick_rate_hz: u32) -> Duration {
    Duration::from_secs(1) / tick_rate_hz.max(1)
}
