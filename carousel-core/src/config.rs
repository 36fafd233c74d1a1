use crate::error::{CoreError, Result};
use crate::paths;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub clips: Vec<ClipConfig>,
    /// Tables owned by other crates (e.g. `[simulation]`), kept verbatim
    #[serde(flatten)]
    pub sections: toml::Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// How often the progress driver samples the active clip
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: u32,
    /// Start playing as soon as the carousel becomes visible
    #[serde(default = "default_true")]
    pub autostart: bool,
    /// Capacity of the frame broadcast channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

const fn default_tick_rate() -> u32 {
    60
}

const fn default_true() -> bool {
    true
}

const fn default_event_buffer() -> usize {
    64
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate(),
            autostart: default_true(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl PlaybackConfig {
    /// Interval between progress ticks
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        crate::time::tick_interval(self.tick_rate_hz)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Also write logs to `~/.config/carousel/carousel.log`
    #[serde(default)]
    pub enabled: bool,
}

/// One `[[clips]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipConfig {
    pub id: String,
    pub media_source: String,
    pub duration_secs: f64,
    #[serde(default)]
    pub caption: Vec<String>,
}

impl CarouselConfig {
    /// Get the config file path (~/.config/carousel/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        paths::config_path()
    }

    /// Load config from the default location, creating a template on first run.
    ///
    /// `extra_templates` are appended to the base template so that other crates
    /// can ship their own sections.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing a fresh template, or an
    /// error if the file cannot be read, parsed or validated.
    pub fn load_or_create(extra_templates: Option<&[&str]>) -> Result<Self> {
        Self::load_or_create_at(&Self::config_path(), extra_templates)
    }

    /// Same as [`Self::load_or_create`] but for an explicit path.
    ///
    /// # Errors
    ///
    /// See [`Self::load_or_create`].
    pub fn load_or_create_at(path: &Path, extra_templates: Option<&[&str]>) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, build_config_template(extra_templates))?;
            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields that have no sensible default.
    ///
    /// # Errors
    ///
    /// Returns an error if no clips are configured or a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.clips.is_empty() {
            return Err(CoreError::ConfigMissingField {
                field: "clips".to_string(),
            });
        }
        if self.playback.tick_rate_hz == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "playback.tick_rate_hz must be greater than zero".to_string(),
            });
        }
        if self.playback.event_buffer == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "playback.event_buffer must be greater than zero".to_string(),
            });
        }
        for (i, clip) in self.clips.iter().enumerate() {
            if clip.id.is_empty() {
                return Err(CoreError::ConfigMissingField {
                    field: format!("clips[{i}].id"),
                });
            }
            if clip.media_source.is_empty() {
                return Err(CoreError::ConfigMissingField {
                    field: format!("clips[{i}].media_source"),
                });
            }
        }
        Ok(())
    }

    /// Deserialize an extra top-level table, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the table exists but does not match `T`.
    pub fn section<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.sections
            .get(name)
            .map(|value| value.clone().try_into::<T>())
            .transpose()
            .map_err(|e| CoreError::ConfigInvalid {
                message: format!("[{name}]: {e}"),
            })
    }
}

/// Build the config file template, appending any extra sections.
#[must_use]
pub fn build_config_template(extra_templates: Option<&[&str]>) -> String {
    let mut template = CONFIG_TEMPLATE.to_string();
    for extra in extra_templates.unwrap_or_default() {
        template.push('\n');
        template.push_str(extra);
    }
    template
}

const CONFIG_TEMPLATE: &str = r#"# Carousel Configuration
# ~/.config/carousel/config.toml

[playback]
# How often the active indicator is resynchronized with the clip (per second)
tick_rate_hz = 60
# Start the first clip as soon as the carousel is visible
autostart = true
event_buffer = 64

[logging]
# Also write logs to ~/.config/carousel/carousel.log
enabled = false

[[clips]]
id = "hero"
media_source = "videos/highlight-first.mp4"
duration_secs = 4.0
caption = ["Enter A17 Pro.", "Game-changing chip.", "Groundbreaking performance."]

[[clips]]
id = "titanium"
media_source = "videos/highlight-second.mp4"
duration_secs = 5.0
caption = ["Titanium.", "So strong. So light. So Pro."]

[[clips]]
id = "zoom"
media_source = "videos/highlight-third.mp4"
duration_secs = 2.0
caption = ["iPhone 15 Pro Max has the", "longest optical zoom in", "iPhone ever. Far out."]

[[clips]]
id = "action"
media_source = "videos/highlight-fourth.mp4"
duration_secs = 3.63
caption = ["All-new Action button.", "What will yours do?"]
"#;
