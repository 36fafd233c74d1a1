use crate::error::Result;
use carousel_core::{CarouselFrame, CarouselHandle, IndicatorPhase, PlaybackState};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "carousel::sim::bridge";

/// What the bridge does with frames besides logging them
#[derive(Debug, Clone, Copy)]
pub struct BridgeOptions {
    /// Replays to request once the sequence completes
    pub replays: u32,
    /// Print every frame as JSON
    pub dump_frames: bool,
}

/// Stand-in renderer: logs every frame the coordinator publishes, presses
/// replay when asked to, and stops the coordinator after the final pass.
///
/// The coordinator goes quiet once the sequence completes, so frames missed
/// before subscribing or while lagging are recovered from the latest-frame
/// slot rather than skipped.
///
/// # Errors
///
/// Returns an error if a frame cannot be serialized.
pub async fn run_bridge(handle: CarouselHandle, options: BridgeOptions) -> Result<()> {
    let mut rx = handle.subscribe();
    let cancel_token = handle.cancel_token();
    let mut renderer = FrameLog::new(options);
    let mut frame = handle.current();

    loop {
        if renderer.render(&handle, &frame)? == Flow::Stop {
            break;
        }

        frame = tokio::select! {
            () = cancel_token.cancelled() => break,
            received = rx.recv() => match received {
                Ok(frame) => frame,
                Err(RecvError::Closed) => {
                    info!(target: LOG_TARGET, "Frame channel closed");
                    break;
                }
                Err(RecvError::Lagged(n)) => {
                    warn!(target: LOG_TARGET, "Renderer missed {} frames, resyncing", n);
                    rx = rx.resubscribe();
                    handle.current()
                }
            },
        };
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct FrameLog {
    last_state: Option<PlaybackState>,
    replays_left: u32,
    dump_frames: bool,
}

impl FrameLog {
    const fn new(options: BridgeOptions) -> Self {
        Self {
            last_state: None,
            replays_left: options.replays,
            dump_frames: options.dump_frames,
        }
    }

    fn render(&mut self, handle: &CarouselHandle, frame: &CarouselFrame) -> Result<Flow> {
        if self.dump_frames {
            println!("{}", serde_json::to_string(frame)?);
        }

        if self.last_state == Some(frame.state) {
            debug!(target: LOG_TARGET, "{}", render_dots(frame));
            return Ok(Flow::Continue);
        }
        info!(
            target: LOG_TARGET,
            "clip {} [{}] {}",
            frame.state.active_index,
            frame.state.control(),
            render_dots(frame)
        );
        self.last_state = Some(frame.state);

        if !frame.state.is_sequence_complete {
            return Ok(Flow::Continue);
        }
        if self.replays_left == 0 {
            info!(target: LOG_TARGET, "Sequence complete, stopping");
            handle.stop();
            return Ok(Flow::Stop);
        }
        self.replays_left -= 1;
        info!(
            target: LOG_TARGET,
            "Sequence complete, replaying ({} left)",
            self.replays_left
        );
        handle.transport().request_replay()?;
        Ok(Flow::Continue)
    }
}

/// Text rendering of the indicator row, e.g. `[##] [#-] [  ]`
fn render_dots(frame: &CarouselFrame) -> String {
    const WIDTH: usize = 10;
    frame
        .indicators
        .iter()
        .map(|indicator| match indicator.phase {
            IndicatorPhase::Completed => format!("[{}]", "#".repeat(WIDTH)),
            IndicatorPhase::Pending => format!("[{}]", " ".repeat(WIDTH)),
            IndicatorPhase::Active => {
                let filled = filled_cells(indicator.fill_fraction, WIDTH);
                format!("[{}{}]", "#".repeat(filled), "-".repeat(WIDTH - filled))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn filled_cells(fraction: f64, width: usize) -> usize {
    (0..=width)
        .rev()
        .find(|cells| {
            let threshold = f64::from(u32::try_from(*cells).unwrap_or(u32::MAX))
                / f64::from(u32::try_from(width).unwrap_or(u32::MAX));
            fraction >= threshold
        })
        .unwrap_or(0)
}
