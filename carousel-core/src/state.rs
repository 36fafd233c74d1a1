//! Playback state snapshot and the events that drive it.

use serde::Serialize;
use std::fmt;

/// Snapshot of the carousel's playback state.
///
/// Owned exclusively by [`PlaybackMachine`](crate::PlaybackMachine); everyone
/// else only ever sees copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlaybackState {
    /// Index of the clip selected for playback
    pub active_index: usize,
    /// Whether playback is requested (granted only once armed)
    pub is_playing: bool,
    /// Set between a clip finishing and the next clip's first progress sample
    pub has_ended: bool,
    /// The last clip has finished; only a replay resumes playback
    pub is_sequence_complete: bool,
    /// Every clip has reported its metadata
    pub is_armed: bool,
}

impl PlaybackState {
    /// Playback is requested and every clip is ready
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.is_playing && self.is_armed
    }

    /// The button a renderer should show for the current state
    #[must_use]
    pub const fn control(&self) -> ControlButton {
        if self.is_sequence_complete {
            ControlButton::Replay
        } else if self.is_playing {
            ControlButton::Pause
        } else {
            ControlButton::Play
        }
    }
}

/// Transport button shown next to the indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlButton {
    Play,
    Pause,
    Replay,
}

impl ControlButton {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Replay => "replay",
        }
    }
}

impl fmt::Display for ControlButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events accepted by the playback state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A clip reported that its metadata is loaded
    ClipReady(usize),
    /// The carousel became visible; start the first clip
    Autostart,
    /// A clip played to its end
    ClipFinished(usize),
    /// Flip between playing and paused
    TogglePlay,
    /// Replay the sequence from the first clip
    Reset,
}

impl fmt::Display for PlaybackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClipReady(index) => write!(f, "CLIP_READY({index})"),
            Self::Autostart => f.write_str("AUTOSTART"),
            Self::ClipFinished(index) => write!(f, "CLIP_FINISHED({index})"),
            Self::TogglePlay => f.write_str("TOGGLE_PLAY"),
            Self::Reset => f.write_str("RESET"),
        }
    }
}
