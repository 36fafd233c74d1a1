//! Media-playback collaborator interfaces.

use crate::error::Result;
use crate::transport::Transport;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Commands and queries the coordinator issues to whatever plays the clips.
///
/// Clips are addressed by their registry index; the coordinator never holds
/// handles to media elements.
pub trait MediaPlayer: Send + Sync {
    /// Start or resume the clip at `index`
    fn play(&self, index: usize);

    /// Pause the clip at `index`
    fn pause(&self, index: usize);

    /// Current playback position of the clip at `index`
    fn current_time(&self, index: usize) -> Duration;

    /// Move the clip at `index` back to its start.
    ///
    /// Called for every clip on replay. Players that restart ended clips on
    /// `play` can keep the default.
    fn rewind(&self, _index: usize) {}
}

/// A long-running source of media notifications (`ended`, `metadataLoaded`).
///
/// Implementations report into a [`Transport`] and should:
///
/// - Report metadata readiness once per clip, in whatever order it arrives
/// - Report `ended` for a clip when its playback reaches the end
/// - Return when the cancellation token is triggered
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Returns a human-readable name for this backend.
    fn name(&self) -> &'static str;

    /// Run the backend until cancelled or an unrecoverable error occurs.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails in a way it cannot recover from.
    async fn run(&self, transport: Transport) -> Result<()>;

    /// Get the cancellation token for this backend.
    fn cancel_token(&self) -> CancellationToken;

    /// Signal the backend to stop.
    fn stop(&self) {
        self.cancel_token().cancel();
    }
}
