use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - please edit the clip list and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Registry errors
    #[error("Clip registry must contain at least one clip")]
    EmptyRegistry,

    #[error("Clip {id} has a non-positive duration")]
    InvalidClipDuration { id: String },

    #[error("Clip id {id} appears more than once")]
    DuplicateClipId { id: String },

    // Coordinator errors
    #[error("Playback coordinator is no longer running")]
    CoordinatorStopped,

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
