//! Simulated media elements.

use crate::config::SimulationConfig;
use async_trait::async_trait;
use carousel_core::{ClipRegistry, CoreError, MediaBackend, MediaPlayer, Transport};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const LOG_TARGET: &str = "carousel::sim::player";

#[derive(Debug, Clone)]
struct SimClip {
    duration: Duration,
    load_delay: Duration,
    position: Duration,
    playing: bool,
    loaded: bool,
    ended_reported: bool,
}

/// Media elements that advance on a fixed step instead of decoding video.
///
/// Behaves like a browser `<video>`: `play` on an ended clip restarts it,
/// metadata arrives after a per-clip delay, and `ended` fires once when a
/// clip reaches its duration.
pub struct SimulatedPlayer {
    clips: Mutex<Vec<SimClip>>,
    speed: f64,
    step: Duration,
    cancel_token: CancellationToken,
}

/// Notifications produced by one simulation step
#[derive(Debug, Default, PartialEq, Eq)]
struct StepReport {
    loaded: Vec<usize>,
    ended: Vec<usize>,
}

impl SimulatedPlayer {
    /// Create a simulated player for every clip in `registry`
    pub fn new(
        registry: &ClipRegistry,
        config: &SimulationConfig,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        let delays = config.load_delays(registry.len());
        let clips = registry
            .iter()
            .zip(delays)
            .map(|(clip, load_delay)| SimClip {
                duration: clip.duration,
                load_delay,
                position: Duration::ZERO,
                playing: false,
                loaded: false,
                ended_reported: false,
            })
            .collect();

        Self {
            clips: Mutex::new(clips),
            speed: config.speed,
            step: config.step(),
            cancel_token: cancel_token.unwrap_or_default(),
        }
    }

    fn clips(&self) -> MutexGuard<'_, Vec<SimClip>> {
        self.clips.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance simulated time by `wall` and collect the notifications due
    /// by `since_start`.
    fn advance(&self, wall: Duration, since_start: Duration) -> StepReport {
        let mut report = StepReport::default();
        let played = wall.mul_f64(self.speed);

        for (index, clip) in self.clips().iter_mut().enumerate() {
            if !clip.loaded && since_start >= clip.load_delay {
                clip.loaded = true;
                report.loaded.push(index);
            }
            if !clip.playing {
                continue;
            }
            clip.position = (clip.position + played).min(clip.duration);
            if clip.position >= clip.duration && !clip.ended_reported {
                clip.playing = false;
                clip.ended_reported = true;
                report.ended.push(index);
            }
        }

        report
    }
}

impl MediaPlayer for SimulatedPlayer {
    fn play(&self, index: usize) {
        if let Some(clip) = self.clips().get_mut(index) {
            if clip.position >= clip.duration {
                clip.position = Duration::ZERO;
                clip.ended_reported = false;
            }
            clip.playing = true;
            debug!(target: LOG_TARGET, "Clip {index} playing from {:?}", clip.position);
        }
    }

    fn pause(&self, index: usize) {
        if let Some(clip) = self.clips().get_mut(index) {
            clip.playing = false;
            debug!(target: LOG_TARGET, "Clip {index} paused at {:?}", clip.position);
        }
    }

    fn current_time(&self, index: usize) -> Duration {
        self.clips()
            .get(index)
            .map_or(Duration::ZERO, |clip| clip.position)
    }

    fn rewind(&self, index: usize) {
        if let Some(clip) = self.clips().get_mut(index) {
            clip.position = Duration::ZERO;
            clip.ended_reported = false;
        }
    }
}

#[async_trait]
impl MediaBackend for SimulatedPlayer {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    async fn run(&self, transport: Transport) -> Result<(), CoreError> {
        info!(target: LOG_TARGET, "Starting simulated media backend");

        let started = Instant::now();
        let mut last = started;
        let mut interval = tokio::time::interval(self.step);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(target: LOG_TARGET, "Media backend shutting down gracefully");
                    break;
                }
                now = interval.tick() => {
                    let report = self.advance(now - last, now - started);
                    last = now;

                    let sent = report
                        .loaded
                        .iter()
                        .try_for_each(|index| transport.metadata_loaded(*index))
                        .and_then(|()| {
                            report
                                .ended
                                .iter()
                                .try_for_each(|index| transport.clip_ended(*index))
                        });

                    if let Err(CoreError::CoordinatorStopped) = sent {
                        info!(target: LOG_TARGET, "Coordinator stopped, media backend exiting");
                        break;
                    }
                    sent?;
                }
            }
        }

        Ok(())
    }
}
