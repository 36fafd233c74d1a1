pub mod config;
pub mod coordinator;
pub mod error;
pub mod indicator;
pub mod machine;
pub mod media;
pub mod paths;
pub mod progress;
pub mod registry;
pub mod state;
pub mod time;
pub mod transport;

pub use config::{
    build_config_template, CarouselConfig, ClipConfig, LoggingConfig, PlaybackConfig,
};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use coordinator::{CarouselFrame, CarouselHandle, Coordinator};
pub use error::CoreError;
pub use indicator::{derive_indicators, IndicatorPhase, IndicatorState};
pub use machine::{PlaybackMachine, Rejection, Transition, TransitionKind};
pub use media::{MediaBackend, MediaPlayer};
pub use paths::{config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use progress::{fill_fraction, DriveTarget, ProgressDriver, ProgressTicker};
pub use registry::{ClipDescriptor, ClipRegistry};
pub use state::{ControlButton, PlaybackEvent, PlaybackState};
pub use time::DurationExt;
pub use transport::Transport;
