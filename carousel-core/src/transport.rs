//! Transport controller: turns user intent and media notifications into
//! playback events for the coordinator.

use crate::error::{CoreError, Result};
use crate::state::PlaybackEvent;
use tokio::sync::mpsc;

/// Cloneable sender side of a coordinator's event queue.
///
/// Holds no playback logic; legality of every event is decided by the
/// state machine.
#[derive(Debug, Clone)]
pub struct Transport {
    tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl Transport {
    /// Create a transport and the receiver its events arrive on
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// The play/pause button was pressed
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoordinatorStopped`] if the coordinator has shut down.
    pub fn request_play_pause(&self) -> Result<()> {
        self.send(PlaybackEvent::TogglePlay)
    }

    /// The replay button was pressed
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoordinatorStopped`] if the coordinator has shut down.
    pub fn request_replay(&self) -> Result<()> {
        self.send(PlaybackEvent::Reset)
    }

    /// The carousel scrolled into view
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoordinatorStopped`] if the coordinator has shut down.
    pub fn viewport_entered(&self) -> Result<()> {
        self.send(PlaybackEvent::Autostart)
    }

    /// The media element for clip `index` reached its end
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoordinatorStopped`] if the coordinator has shut down.
    pub fn clip_ended(&self, index: usize) -> Result<()> {
        self.send(PlaybackEvent::ClipFinished(index))
    }

    /// The media element for clip `index` loaded its metadata
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoordinatorStopped`] if the coordinator has shut down.
    pub fn metadata_loaded(&self, index: usize) -> Result<()> {
        self.send(PlaybackEvent::ClipReady(index))
    }

    fn send(&self, event: PlaybackEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| CoreError::CoordinatorStopped)
    }
}
