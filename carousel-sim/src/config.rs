//! `[simulation]` configuration section.

use crate::error::{Result, SimError};
use carousel_core::CarouselConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name of the table in the shared config file
pub const SECTION_NAME: &str = "simulation";

/// Simulator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Playback speed multiplier relative to wall time
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// How often simulated clips advance, in milliseconds
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    /// Per-clip metadata load delay; empty staggers clips in reverse order
    #[serde(default)]
    pub load_delays_ms: Vec<u64>,
    /// Number of replays to request after the sequence completes
    #[serde(default = "default_replays")]
    pub replays: u32,
    /// Print every frame as JSON on stdout
    #[serde(default)]
    pub dump_frames: bool,
}

const fn default_speed() -> f64 {
    1.0
}

const fn default_step_ms() -> u64 {
    10
}

const fn default_replays() -> u32 {
    1
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            step_ms: default_step_ms(),
            load_delays_ms: Vec::new(),
            replays: default_replays(),
            dump_frames: false,
        }
    }
}

impl SimulationConfig {
    /// Extract the simulation section, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is malformed.
    pub fn from_config(config: &CarouselConfig) -> Result<Self> {
        Ok(config.section(SECTION_NAME)?.unwrap_or_default())
    }

    /// Check the settings against the number of clips.
    ///
    /// # Errors
    ///
    /// Returns an error if the speed is not positive or the delay list does
    /// not match the clip count.
    pub fn validate(&self, clip_count: usize) -> Result<()> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(SimError::InvalidSpeed(self.speed));
        }
        if !self.load_delays_ms.is_empty() && self.load_delays_ms.len() != clip_count {
            return Err(SimError::LoadDelayCount {
                given: self.load_delays_ms.len(),
                clips: clip_count,
            });
        }
        Ok(())
    }

    /// Metadata delay for every clip
    #[must_use]
    pub fn load_delays(&self, clip_count: usize) -> Vec<Duration> {
        if self.load_delays_ms.is_empty() {
            // Later clips finish loading first, exercising out-of-order readiness.
            return (0..clip_count)
                .map(|i| Duration::from_millis(50) * u32::try_from(clip_count - i).unwrap_or(1))
                .collect();
        }
        self.load_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    #[must_use]
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms.max(1))
    }
}

/// Config template for the simulator.
/// This is appended to the base config template when creating a new config file.
pub const CONFIG_TEMPLATE: &str = r"[simulation]
# Playback speed relative to wall time
speed = 1.0
step_ms = 10
# Metadata load delay per clip in milliseconds (empty = staggered, last clip first)
load_delays_ms = []
# How many times to press replay after the sequence completes
replays = 1
dump_frames = false
";
