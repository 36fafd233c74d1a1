//! Progress driver: maps the active clip's live playback time to a fill
//! fraction for its indicator.

use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Completed fraction of a clip, clamped to `[0, 1]`.
///
/// A zero `duration` yields `0.0`.
#[must_use]
pub fn fill_fraction(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// The clip the driver is currently following
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveTarget {
    pub index: usize,
    pub duration: Duration,
}

/// Tracks the fill fraction of one clip at a time.
///
/// The fraction is recomputed from the sampled playback time on every tick
/// rather than advanced by its own timer, so a stalled clip stalls its
/// indicator too.
#[derive(Debug, Clone, Default)]
pub struct ProgressDriver {
    target: Option<DriveTarget>,
    fraction: f64,
    running: bool,
}

impl ProgressDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn target(&self) -> Option<DriveTarget> {
        self.target
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Latest fraction of the current target
    #[must_use]
    pub const fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Fraction to display for `index`: the live value when it is the
    /// target, otherwise zero.
    #[must_use]
    pub fn live_fraction(&self, index: usize) -> f64 {
        match self.target {
            Some(target) if target.index == index => self.fraction,
            _ => 0.0,
        }
    }

    /// Follow `index`, seeding the fraction from its current elapsed time.
    pub fn retarget(&mut self, index: usize, duration: Duration, elapsed: Duration) -> f64 {
        self.target = Some(DriveTarget { index, duration });
        self.fraction = fill_fraction(elapsed, duration);
        self.running = true;
        self.fraction
    }

    /// Record a playback-time sample.
    ///
    /// Returns `None` and changes nothing when the driver is suspended or
    /// `index` is not the current target.
    pub fn sample(&mut self, index: usize, elapsed: Duration) -> Option<f64> {
        let target = self.target.filter(|t| t.index == index && self.running)?;
        self.fraction = fill_fraction(elapsed, target.duration);
        Some(self.fraction)
    }

    /// Force the finishing clip to exactly full and stop driving it.
    pub fn complete(&mut self, index: usize) -> Option<f64> {
        self.target.filter(|t| t.index == index)?;
        self.fraction = 1.0;
        self.running = false;
        Some(self.fraction)
    }

    /// Stop sampling but keep the last fraction on display
    pub fn suspend(&mut self) {
        self.running = false;
    }
}

/// A per-instance tick subscription bound to one clip index.
///
/// Dropping the ticker cancels it; the coordinator replaces it whenever the
/// active clip changes and drops it whenever playback stops.
#[derive(Debug)]
pub struct ProgressTicker {
    index: usize,
    interval: Interval,
}

impl ProgressTicker {
    /// Create a ticker for `index`. The first tick fires immediately.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(index: usize, period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { index, interval }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Wait for the next tick, returning the index this ticker drives
    pub async fn tick(&mut self) -> usize {
        self.interval.tick().await;
        self.index
    }
}
