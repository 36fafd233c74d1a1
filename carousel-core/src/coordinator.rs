//! Single-writer playback coordinator.
//!
//! One task owns the [`PlaybackMachine`] and the [`ProgressDriver`]. Events
//! from the [`Transport`] and ticks from the active [`ProgressTicker`] are
//! handled strictly one at a time, and every visible change is published
//! as a [`CarouselFrame`].

use crate::config::PlaybackConfig;
use crate::error::{CoreError, Result};
use crate::indicator::{derive_indicators, IndicatorState};
use crate::machine::{PlaybackMachine, Rejection, Transition, TransitionKind};
use crate::media::MediaPlayer;
use crate::progress::{ProgressDriver, ProgressTicker};
use crate::registry::ClipRegistry;
use crate::state::{PlaybackEvent, PlaybackState};
use crate::transport::Transport;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const LOG_TARGET: &str = "carousel::coordinator";

/// Everything a renderer needs to draw the carousel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselFrame {
    pub state: PlaybackState,
    pub indicators: Vec<IndicatorState>,
}

/// Handle for talking to a running [`Coordinator`]
#[derive(Debug, Clone)]
pub struct CarouselHandle {
    transport: Transport,
    frame_tx: broadcast::Sender<CarouselFrame>,
    current: watch::Receiver<CarouselFrame>,
    cancel_token: CancellationToken,
}

impl CarouselHandle {
    /// Transport for user intents and media notifications
    #[must_use]
    pub fn transport(&self) -> Transport {
        self.transport.clone()
    }

    /// Subscribe to every published frame
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CarouselFrame> {
        self.frame_tx.subscribe()
    }

    /// Most recently published frame
    #[must_use]
    pub fn current(&self) -> CarouselFrame {
        self.current.borrow().clone()
    }

    /// Wait until a published frame satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CoordinatorStopped`] if the coordinator exits first.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&CarouselFrame) -> bool,
    ) -> Result<CarouselFrame> {
        let mut current = self.current.clone();
        let frame = current
            .wait_for(predicate)
            .await
            .map_err(|_| CoreError::CoordinatorStopped)?;
        Ok(frame.clone())
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Stop the coordinator task
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }
}

/// Owns playback state for one carousel instance
pub struct Coordinator {
    registry: ClipRegistry,
    media: Arc<dyn MediaPlayer>,
    machine: PlaybackMachine,
    driver: ProgressDriver,
    ticker: Option<ProgressTicker>,
    tick_interval: Duration,
    events: mpsc::UnboundedReceiver<PlaybackEvent>,
    frame_tx: broadcast::Sender<CarouselFrame>,
    current_tx: watch::Sender<CarouselFrame>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    /// Create a coordinator and its handle.
    ///
    /// # Arguments
    /// * `registry` - Clips to play, in order
    /// * `media` - Player the coordinator commands
    /// * `config` - Tick rate and channel sizing
    /// * `cancel_token` - Optional external cancellation token for graceful shutdown
    #[must_use]
    pub fn new(
        registry: ClipRegistry,
        media: Arc<dyn MediaPlayer>,
        config: &PlaybackConfig,
        cancel_token: Option<CancellationToken>,
    ) -> (Self, CarouselHandle) {
        let (transport, events) = Transport::channel();
        let (frame_tx, _) = broadcast::channel(config.event_buffer.max(1));
        let cancel_token = cancel_token.unwrap_or_default();

        let machine = PlaybackMachine::new(registry.len());
        let driver = ProgressDriver::new();
        let initial = build_frame(&machine, &driver);
        let (current_tx, current) = watch::channel(initial);

        let handle = CarouselHandle {
            transport,
            frame_tx: frame_tx.clone(),
            current,
            cancel_token: cancel_token.clone(),
        };

        let coordinator = Self {
            registry,
            media,
            machine,
            driver,
            ticker: None,
            tick_interval: config.tick_interval(),
            events,
            frame_tx,
            current_tx,
            cancel_token,
        };

        (coordinator, handle)
    }

    /// Start the coordinator in a background task
    #[must_use]
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the event loop until cancelled or every transport is dropped
    pub async fn run(mut self) {
        info!(
            target: LOG_TARGET,
            "Starting playback coordinator for {} clip(s)",
            self.registry.len()
        );

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(target: LOG_TARGET, "Coordinator shutting down gracefully");
                    break;
                }
                event = self.events.recv() => {
                    let Some(event) = event else {
                        info!(target: LOG_TARGET, "All transports dropped, stopping coordinator");
                        break;
                    };
                    self.handle_event(event);
                }
                index = next_tick(&mut self.ticker) => {
                    self.handle_tick(index);
                }
            }
        }

        self.ticker = None;
        self.driver.suspend();
    }

    fn handle_event(&mut self, event: PlaybackEvent) {
        match self.machine.apply(event) {
            Ok(transition) => {
                debug!(
                    target: LOG_TARGET,
                    "{event} accepted: {:?} -> {:?}",
                    transition.kind,
                    transition.state
                );
                self.apply_transition(&transition);
            }
            Err(Rejection::PrematureAutostart) => {
                info!(
                    target: LOG_TARGET,
                    "Autostart deferred until all clips are ready ({}/{})",
                    self.machine.ready_count(),
                    self.machine.clip_count()
                );
            }
            Err(rejection) => {
                debug!(target: LOG_TARGET, "Ignoring event: {rejection}");
            }
        }
    }

    fn apply_transition(&mut self, transition: &Transition) {
        let state = transition.state;

        match transition.kind {
            TransitionKind::ReadinessRecorded { .. } => return,
            TransitionKind::Advanced { from } | TransitionKind::SequenceCompleted { index: from } => {
                self.driver.complete(from);
            }
            TransitionKind::Replayed => {
                for index in 0..self.registry.len() {
                    self.media.rewind(index);
                }
            }
            TransitionKind::Armed { .. } | TransitionKind::Started | TransitionKind::Toggled => {}
        }

        if state.is_armed {
            let index = state.active_index;
            if state.is_running() {
                self.media.play(index);
                if !self.driver.is_running() || self.ticker_index() != Some(index) {
                    let elapsed = if transition.kind == TransitionKind::Replayed {
                        Duration::ZERO
                    } else {
                        self.media.current_time(index)
                    };
                    self.driver
                        .retarget(index, self.registry.duration(index), elapsed);
                    self.ticker = Some(ProgressTicker::new(index, self.tick_interval));
                }
            } else {
                self.media.pause(index);
                self.driver.suspend();
                self.ticker = None;
            }
        }

        if transition.changed() {
            self.publish();
        }
    }

    fn handle_tick(&mut self, index: usize) {
        let state = self.machine.state();
        if index != state.active_index || !state.is_running() {
            debug!(target: LOG_TARGET, "Dropping stale tick for clip {index}");
            self.ticker = None;
            return;
        }

        let previous = self.driver.fraction();
        let elapsed = self.media.current_time(index);
        let Some(fraction) = self.driver.sample(index, elapsed) else {
            return;
        };
        let settled = self.machine.settle();

        if settled || (fraction - previous).abs() > f64::EPSILON {
            self.publish();
        }
    }

    fn ticker_index(&self) -> Option<usize> {
        self.ticker.as_ref().map(ProgressTicker::index)
    }

    fn publish(&self) {
        let frame = build_frame(&self.machine, &self.driver);
        self.current_tx.send_replace(frame.clone());
        let _ = self.frame_tx.send(frame);
    }
}

fn build_frame(machine: &PlaybackMachine, driver: &ProgressDriver) -> CarouselFrame {
    let state = machine.state();
    CarouselFrame {
        state,
        indicators: derive_indicators(
            &state,
            machine.clip_count(),
            driver.live_fraction(state.active_index),
        ),
    }
}

/// Next tick of the active ticker, or never when playback is stopped
async fn next_tick(ticker: &mut Option<ProgressTicker>) -> usize {
    match ticker {
        Some(ticker) => ticker.tick().await,
        None => std::future::pending().await,
    }
}
