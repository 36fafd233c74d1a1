use carousel_core::CoreError;
use thiserror::Error;

/// Errors raised by the simulator binary.
#[derive(Debug, Error)]
pub enum SimError {
    /// Error from the playback core (config, registry, coordinator).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// `[simulation]` does not list a load delay for every clip.
    #[error("simulation.load_delays_ms has {given} entries but there are {clips} clips")]
    LoadDelayCount { given: usize, clips: usize },

    /// `simulation.speed` is not a positive finite number.
    #[error("simulation.speed must be a positive number, got {0}")]
    InvalidSpeed(f64),

    /// Failed to serialize a frame dump.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results with `SimError`.
pub type Result<T> = std::result::Result<T, SimError>;
