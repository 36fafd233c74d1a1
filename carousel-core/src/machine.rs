//! The playback state machine.
//!
//! All mutation of [`PlaybackState`] goes through [`PlaybackMachine::apply`].
//! Events that are not legal in the current state are rejected with a
//! [`Rejection`] and leave the state untouched; rejections are expected
//! (media callbacks race with user input) and are never fatal.

use crate::state::{PlaybackEvent, PlaybackState};
use thiserror::Error;

/// Why an event was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The event refers to a clip that is not the active one
    #[error("stale event for clip {index}, active clip is {active}")]
    StaleEvent { index: usize, active: usize },

    /// Autostart arrived before every clip was ready; it is queued, not dropped
    #[error("autostart requested before all clips are ready, deferring")]
    PrematureAutostart,

    /// The event is not legal in the current state
    #[error("{event} ignored: {reason}")]
    InvalidTransition {
        event: PlaybackEvent,
        reason: &'static str,
    },
}

/// What an accepted event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// A clip reported ready but others are still loading
    ReadinessRecorded { index: usize, ready: usize },
    /// The last outstanding clip reported ready
    Armed { autostarted: bool },
    /// Playback started on the first clip
    Started,
    /// A clip finished and the next one became active
    Advanced { from: usize },
    /// The last clip finished
    SequenceCompleted { index: usize },
    /// Play/pause was flipped
    Toggled,
    /// The sequence restarted from the first clip
    Replayed,
}

/// An accepted transition with the state before and after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub previous: PlaybackState,
    pub state: PlaybackState,
}

impl Transition {
    /// Whether the visible state changed
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutostartGate {
    Waiting,
    Deferred,
    Fired,
}

/// Single owner of the carousel's [`PlaybackState`]
#[derive(Debug, Clone)]
pub struct PlaybackMachine {
    clip_count: usize,
    state: PlaybackState,
    ready: Vec<bool>,
    ready_count: usize,
    autostart: AutostartGate,
}

impl PlaybackMachine {
    /// Create a machine for `clip_count` clips, idle on the first clip.
    ///
    /// A count of zero is treated as one so `active_index` is always valid.
    #[must_use]
    pub fn new(clip_count: usize) -> Self {
        let clip_count = clip_count.max(1);
        Self {
            clip_count,
            state: PlaybackState::default(),
            ready: vec![false; clip_count],
            ready_count: 0,
            autostart: AutostartGate::Waiting,
        }
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub const fn clip_count(&self) -> usize {
        self.clip_count
    }

    /// Number of distinct clips that have reported ready
    #[must_use]
    pub const fn ready_count(&self) -> usize {
        self.ready_count
    }

    /// An autostart is queued until every clip is ready
    #[must_use]
    pub fn has_deferred_autostart(&self) -> bool {
        self.autostart == AutostartGate::Deferred
    }

    const fn last_index(&self) -> usize {
        self.clip_count - 1
    }

    /// Apply an event.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when the event is stale, deferred or not legal
    /// in the current state. The state is unchanged in every error case.
    pub fn apply(&mut self, event: PlaybackEvent) -> Result<Transition, Rejection> {
        let previous = self.state;
        let kind = match event {
            PlaybackEvent::ClipReady(index) => self.clip_ready(index)?,
            PlaybackEvent::Autostart => self.autostart()?,
            PlaybackEvent::ClipFinished(index) => self.clip_finished(index)?,
            PlaybackEvent::TogglePlay => self.toggle_play()?,
            PlaybackEvent::Reset => self.reset()?,
        };
        Ok(Transition {
            kind,
            previous,
            state: self.state,
        })
    }

    /// Clear `has_ended` once the newly active clip has produced progress.
    ///
    /// Returns whether anything changed.
    pub fn settle(&mut self) -> bool {
        std::mem::replace(&mut self.state.has_ended, false)
    }

    fn clip_ready(&mut self, index: usize) -> Result<TransitionKind, Rejection> {
        let event = PlaybackEvent::ClipReady(index);
        let Some(slot) = self.ready.get_mut(index) else {
            return Err(Rejection::InvalidTransition {
                event,
                reason: "clip index out of range",
            });
        };
        if *slot {
            return Err(Rejection::InvalidTransition {
                event,
                reason: "clip already reported ready",
            });
        }
        *slot = true;
        self.ready_count += 1;

        if self.ready_count < self.clip_count {
            return Ok(TransitionKind::ReadinessRecorded {
                index,
                ready: self.ready_count,
            });
        }

        self.state.is_armed = true;
        let autostarted = self.autostart == AutostartGate::Deferred;
        if autostarted {
            self.autostart = AutostartGate::Fired;
            self.state.is_playing = true;
        }
        Ok(TransitionKind::Armed { autostarted })
    }

    fn autostart(&mut self) -> Result<TransitionKind, Rejection> {
        let event = PlaybackEvent::Autostart;
        if self.autostart == AutostartGate::Fired || self.state.is_playing {
            return Err(Rejection::InvalidTransition {
                event,
                reason: "playback already started",
            });
        }
        if self.state.is_sequence_complete {
            return Err(Rejection::InvalidTransition {
                event,
                reason: "sequence is complete",
            });
        }
        if !self.state.is_armed {
            self.autostart = AutostartGate::Deferred;
            return Err(Rejection::PrematureAutostart);
        }

        self.autostart = AutostartGate::Fired;
        self.state.is_playing = true;
        Ok(TransitionKind::Started)
    }

    fn clip_finished(&mut self, index: usize) -> Result<TransitionKind, Rejection> {
        let event = PlaybackEvent::ClipFinished(index);
        if index != self.state.active_index {
            return Err(Rejection::StaleEvent {
                index,
                active: self.state.active_index,
            });
        }
        if !self.state.is_armed {
            return Err(Rejection::InvalidTransition {
                event,
                reason: "clips are still loading",
            });
        }
        if self.state.is_sequence_complete {
            return Err(Rejection::InvalidTransition {
                event,
                reason: "sequence is already complete",
            });
        }

        if index < self.last_index() {
            self.state.has_ended = true;
            self.state.active_index = index + 1;
            return Ok(TransitionKind::Advanced { from: index });
        }

        self.state.is_sequence_complete = true;
        self.state.is_playing = false;
        self.state.has_ended = false;
        Ok(TransitionKind::SequenceCompleted { index })
    }

    fn toggle_play(&mut self) -> Result<TransitionKind, Rejection> {
        if self.state.is_sequence_complete {
            return Err(Rejection::InvalidTransition {
                event: PlaybackEvent::TogglePlay,
                reason: "sequence is complete, replay instead",
            });
        }
        // An explicit play/pause overrides any pending or future autostart.
        self.autostart = AutostartGate::Fired;
        self.state.is_playing = !self.state.is_playing;
        Ok(TransitionKind::Toggled)
    }

    fn reset(&mut self) -> Result<TransitionKind, Rejection> {
        if !self.state.is_sequence_complete {
            return Err(Rejection::InvalidTransition {
                event: PlaybackEvent::Reset,
                reason: "sequence is not complete",
            });
        }
        self.state.active_index = 0;
        self.state.is_sequence_complete = false;
        self.state.has_ended = false;
        self.state.is_playing = true;
        Ok(TransitionKind::Replayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed(clip_count: usize) -> PlaybackMachine {
        let mut machine = PlaybackMachine::new(clip_count);
        for i in 0..clip_count {
            machine.apply(PlaybackEvent::ClipReady(i)).unwrap();
        }
        machine
    }

    fn playing(clip_count: usize) -> PlaybackMachine {
        let mut machine = armed(clip_count);
        machine.apply(PlaybackEvent::Autostart).unwrap();
        machine
    }

    #[test]
    fn test_new_machine_is_idle() {
        let machine = PlaybackMachine::new(4);
        assert_eq!(machine.state(), PlaybackState::default());
        assert_eq!(machine.clip_count(), 4);
        assert_eq!(machine.ready_count(), 0);
    }

    #[test]
    fn test_zero_clips_treated_as_one() {
        let machine = PlaybackMachine::new(0);
        assert_eq!(machine.clip_count(), 1);
    }

    #[test]
    fn test_ready_then_autostart_for_any_count() {
        for n in 1..=6 {
            let machine = playing(n);
            let state = machine.state();
            assert_eq!(state.active_index, 0, "clip count {n}");
            assert!(state.is_playing, "clip count {n}");
            assert!(state.is_armed, "clip count {n}");
        }
    }

    #[test]
    fn test_readiness_in_any_order() {
        let mut machine = PlaybackMachine::new(3);
        let first = machine.apply(PlaybackEvent::ClipReady(2)).unwrap();
        assert_eq!(
            first.kind,
            TransitionKind::ReadinessRecorded { index: 2, ready: 1 }
        );
        assert!(!first.changed());

        machine.apply(PlaybackEvent::ClipReady(0)).unwrap();
        assert!(!machine.state().is_armed);

        let last = machine.apply(PlaybackEvent::ClipReady(1)).unwrap();
        assert_eq!(last.kind, TransitionKind::Armed { autostarted: false });
        assert!(last.changed());
        assert!(machine.state().is_armed);
        assert!(!machine.state().is_playing);
    }

    #[test]
    fn test_duplicate_ready_counts_once() {
        let mut machine = PlaybackMachine::new(2);
        machine.apply(PlaybackEvent::ClipReady(0)).unwrap();
        let result = machine.apply(PlaybackEvent::ClipReady(0));
        assert!(matches!(result, Err(Rejection::InvalidTransition { .. })));
        assert_eq!(machine.ready_count(), 1);
        assert!(!machine.state().is_armed);
    }

    #[test]
    fn test_ready_out_of_range() {
        let mut machine = PlaybackMachine::new(2);
        let result = machine.apply(PlaybackEvent::ClipReady(5));
        assert!(matches!(result, Err(Rejection::InvalidTransition { .. })));
        assert_eq!(machine.ready_count(), 0);
    }

    #[test]
    fn test_premature_autostart_is_deferred() {
        let mut machine = PlaybackMachine::new(2);
        machine.apply(PlaybackEvent::ClipReady(1)).unwrap();

        let result = machine.apply(PlaybackEvent::Autostart);
        assert_eq!(result, Err(Rejection::PrematureAutostart));
        assert!(machine.has_deferred_autostart());
        assert!(!machine.state().is_playing);

        let armed = machine.apply(PlaybackEvent::ClipReady(0)).unwrap();
        assert_eq!(armed.kind, TransitionKind::Armed { autostarted: true });
        assert!(machine.state().is_running());
        assert!(!machine.has_deferred_autostart());
    }

    #[test]
    fn test_autostart_is_idempotent() {
        let mut machine = playing(3);
        let before = machine.state();
        let result = machine.apply(PlaybackEvent::Autostart);
        assert!(matches!(result, Err(Rejection::InvalidTransition { .. })));
        assert_eq!(machine.state(), before);
    }

    #[test]
    fn test_autostart_after_user_pause_is_ignored() {
        let mut machine = armed(2);
        machine.apply(PlaybackEvent::TogglePlay).unwrap();
        machine.apply(PlaybackEvent::TogglePlay).unwrap();
        assert!(!machine.state().is_playing);

        let result = machine.apply(PlaybackEvent::Autostart);
        assert!(result.is_err());
        assert!(!machine.state().is_playing);
    }

    #[test]
    fn test_toggle_before_arming_consumes_deferred_autostart() {
        let mut machine = PlaybackMachine::new(2);
        machine.apply(PlaybackEvent::ClipReady(0)).unwrap();
        assert_eq!(
            machine.apply(PlaybackEvent::Autostart),
            Err(Rejection::PrematureAutostart)
        );
        assert!(machine.has_deferred_autostart());

        // Play then pause before the last clip loads: the user's pause wins.
        machine.apply(PlaybackEvent::TogglePlay).unwrap();
        machine.apply(PlaybackEvent::TogglePlay).unwrap();
        assert!(!machine.has_deferred_autostart());

        let armed = machine.apply(PlaybackEvent::ClipReady(1)).unwrap();
        assert_eq!(armed.kind, TransitionKind::Armed { autostarted: false });
        assert!(!machine.state().is_playing);
        assert!(machine.apply(PlaybackEvent::Autostart).is_err());
        assert!(!machine.state().is_playing);
    }

    #[test]
    fn test_single_toggle_before_arming_plays_once_armed() {
        let mut machine = PlaybackMachine::new(2);
        machine.apply(PlaybackEvent::Autostart).unwrap_err();
        machine.apply(PlaybackEvent::TogglePlay).unwrap();
        assert!(machine.state().is_playing);
        assert!(!machine.state().is_running());

        machine.apply(PlaybackEvent::ClipReady(1)).unwrap();
        let armed = machine.apply(PlaybackEvent::ClipReady(0)).unwrap();
        assert_eq!(armed.kind, TransitionKind::Armed { autostarted: false });
        assert!(machine.state().is_running());
    }

    #[test]
    fn test_stale_finish_is_noop() {
        let mut machine = playing(4);
        let before = machine.state();
        for k in [1, 2, 3, 9] {
            let result = machine.apply(PlaybackEvent::ClipFinished(k));
            assert_eq!(
                result,
                Err(Rejection::StaleEvent {
                    index: k,
                    active: 0
                })
            );
            assert_eq!(machine.state(), before);
        }
    }

    #[test]
    fn test_finish_advances_by_one() {
        let mut machine = playing(4);
        for k in 0..3 {
            let transition = machine.apply(PlaybackEvent::ClipFinished(k)).unwrap();
            assert_eq!(transition.kind, TransitionKind::Advanced { from: k });
            let state = machine.state();
            assert_eq!(state.active_index, k + 1);
            assert!(state.is_playing);
            assert!(state.has_ended);
            assert!(machine.settle());
            assert!(!machine.state().has_ended);
        }
    }

    #[test]
    fn test_settle_without_ended_is_noop() {
        let mut machine = playing(2);
        assert!(!machine.settle());
    }

    #[test]
    fn test_finish_last_completes_sequence() {
        let mut machine = playing(2);
        machine.apply(PlaybackEvent::ClipFinished(0)).unwrap();
        let transition = machine.apply(PlaybackEvent::ClipFinished(1)).unwrap();
        assert_eq!(transition.kind, TransitionKind::SequenceCompleted { index: 1 });

        let state = machine.state();
        assert_eq!(state.active_index, 1);
        assert!(state.is_sequence_complete);
        assert!(!state.is_playing);
        assert!(!state.has_ended);
    }

    #[test]
    fn test_finish_after_complete_is_rejected() {
        let mut machine = playing(1);
        machine.apply(PlaybackEvent::ClipFinished(0)).unwrap();
        let before = machine.state();
        assert!(machine.apply(PlaybackEvent::ClipFinished(0)).is_err());
        assert_eq!(machine.state(), before);
    }

    #[test]
    fn test_finish_before_armed_is_rejected() {
        let mut machine = PlaybackMachine::new(2);
        let result = machine.apply(PlaybackEvent::ClipFinished(0));
        assert!(matches!(result, Err(Rejection::InvalidTransition { .. })));
    }

    #[test]
    fn test_toggle_play() {
        let mut machine = playing(3);
        machine.apply(PlaybackEvent::TogglePlay).unwrap();
        assert!(!machine.state().is_playing);
        machine.apply(PlaybackEvent::TogglePlay).unwrap();
        assert!(machine.state().is_playing);
    }

    #[test]
    fn test_toggle_rejected_when_complete() {
        let mut machine = playing(1);
        machine.apply(PlaybackEvent::ClipFinished(0)).unwrap();
        let before = machine.state();
        assert!(machine.apply(PlaybackEvent::TogglePlay).is_err());
        assert_eq!(machine.state(), before);
    }

    #[test]
    fn test_reset_requires_complete() {
        let mut machine = playing(3);
        machine.apply(PlaybackEvent::ClipFinished(0)).unwrap();
        let before = machine.state();
        let result = machine.apply(PlaybackEvent::Reset);
        assert!(matches!(result, Err(Rejection::InvalidTransition { .. })));
        assert_eq!(machine.state(), before);
    }

    #[test]
    fn test_reset_replays_from_first_clip() {
        let mut machine = playing(3);
        for k in 0..3 {
            machine.apply(PlaybackEvent::ClipFinished(k)).unwrap();
        }
        let transition = machine.apply(PlaybackEvent::Reset).unwrap();
        assert_eq!(transition.kind, TransitionKind::Replayed);

        let state = machine.state();
        assert_eq!(state.active_index, 0);
        assert!(state.is_playing);
        assert!(!state.is_sequence_complete);
        assert!(state.is_armed);
    }

    #[test]
    fn test_rejection_display() {
        let rejection = Rejection::InvalidTransition {
            event: PlaybackEvent::Reset,
            reason: "sequence is not complete",
        };
        assert_eq!(rejection.to_string(), "RESET ignored: sequence is not complete");
    }
}
