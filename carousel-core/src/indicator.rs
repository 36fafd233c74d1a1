//! Indicator bank: per-clip display state derived from playback state.
//!
//! Sizing and colors are left to the renderer; this module only decides
//! how full each indicator is and which phase it is in.

use crate::state::PlaybackState;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorPhase {
    Pending,
    Active,
    Completed,
}

/// Display state of a single navigation dot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorState {
    /// How full the indicator is, in `[0, 1]`
    pub fill_fraction: f64,
    pub phase: IndicatorPhase,
}

impl IndicatorState {
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            fill_fraction: 0.0,
            phase: IndicatorPhase::Pending,
        }
    }

    #[must_use]
    pub fn active(fill_fraction: f64) -> Self {
        Self {
            fill_fraction: fill_fraction.clamp(0.0, 1.0),
            phase: IndicatorPhase::Active,
        }
    }

    #[must_use]
    pub const fn completed() -> Self {
        Self {
            fill_fraction: 1.0,
            phase: IndicatorPhase::Completed,
        }
    }
}

/// Derive every indicator from the playback state and the driver's live
/// fraction for the active clip.
///
/// Clips before the active one are completed, as is the active clip once
/// the whole sequence has finished. Clips after it are pending.
#[must_use]
pub fn derive_indicators(
    state: &PlaybackState,
    clip_count: usize,
    live_fraction: f64,
) -> Vec<IndicatorState> {
    (0..clip_count)
        .map(|k| {
            if k < state.active_index || (k == state.active_index && state.is_sequence_complete) {
                IndicatorState::completed()
            } else if k == state.active_index {
                IndicatorState::active(live_fraction)
            } else {
                IndicatorState::pending()
            }
        })
        .collect()
}
