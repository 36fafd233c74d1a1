//! Ordered, immutable list of clips shown by a carousel.

use crate::config::ClipConfig;
use crate::error::{CoreError, Result};
use crate::time::DurationExt;
use std::collections::HashSet;
use std::time::Duration;

/// A single clip in the carousel
#[derive(Debug, Clone, PartialEq)]
pub struct ClipDescriptor {
    /// Stable identifier of the clip
    pub id: String,
    /// Where the media collaborator loads the clip from
    pub media_source: String,
    /// Nominal clip length, always greater than zero
    pub duration: Duration,
    /// Caption shown over the clip, one entry per line
    pub caption_lines: Vec<String>,
}

impl ClipDescriptor {
    /// Create a new clip descriptor
    #[must_use]
    pub fn new(id: impl Into<String>, media_source: impl Into<String>, duration: Duration) -> Self {
        Self {
            id: id.into(),
            media_source: media_source.into(),
            duration,
            caption_lines: Vec::new(),
        }
    }

    /// Append a caption line
    #[must_use]
    pub fn with_caption_line(mut self, line: impl Into<String>) -> Self {
        self.caption_lines.push(line.into());
        self
    }
}

impl From<&ClipConfig> for ClipDescriptor {
    fn from(config: &ClipConfig) -> Self {
        Self {
            id: config.id.clone(),
            media_source: config.media_source.clone(),
            duration: Duration::from_secs_f64_lossy(config.duration_secs),
            caption_lines: config.caption.clone(),
        }
    }
}

/// The clip registry. Validated once at construction and never mutated.
#[derive(Debug, Clone)]
pub struct ClipRegistry {
    clips: Vec<ClipDescriptor>,
}

impl ClipRegistry {
    /// Build a registry from an ordered list of clips.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, a clip has a zero duration, or
    /// two clips share an id.
    pub fn new(clips: Vec<ClipDescriptor>) -> Result<Self> {
        if clips.is_empty() {
            return Err(CoreError::EmptyRegistry);
        }

        let mut seen = HashSet::with_capacity(clips.len());
        for clip in &clips {
            if clip.duration.is_zero() {
                return Err(CoreError::InvalidClipDuration {
                    id: clip.id.clone(),
                });
            }
            if !seen.insert(clip.id.as_str()) {
                return Err(CoreError::DuplicateClipId {
                    id: clip.id.clone(),
                });
            }
        }

        Ok(Self { clips })
    }

    /// Build a registry from the `[[clips]]` config entries.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_config(clips: &[ClipConfig]) -> Result<Self> {
        Self::new(clips.iter().map(ClipDescriptor::from).collect())
    }

    /// Number of clips, always at least one
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Always false; kept for API symmetry with collections
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Index of the final clip
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.clips.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ClipDescriptor> {
        self.clips.get(index)
    }

    /// Duration of the clip at `index`, or zero for an unknown index
    #[must_use]
    pub fn duration(&self, index: usize) -> Duration {
        self.clips
            .get(index)
            .map_or(Duration::ZERO, |clip| clip.duration)
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, ClipDescriptor> {
        self.clips.iter()
    }
}

impl<'a> IntoIterator for &'a ClipRegistry {
    type Item = &'a ClipDescriptor;
    type IntoIter = std::slice::Iter<'a, ClipDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.clips.iter()
    }
}
