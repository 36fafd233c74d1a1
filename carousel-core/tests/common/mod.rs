#![allow(dead_code)]

use carousel_core::{
    CarouselHandle, ClipDescriptor, ClipRegistry, Coordinator, MediaPlayer, PlaybackConfig,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play(usize),
    Pause(usize),
    Rewind(usize),
}

/// In-memory player whose clip positions are set by the test
pub struct ScriptedPlayer {
    times: Mutex<Vec<Duration>>,
    commands: Mutex<Vec<Command>>,
}

impl ScriptedPlayer {
    pub fn new(clip_count: usize) -> Arc<Self> {
        Arc::new(Self {
            times: Mutex::new(vec![Duration::ZERO; clip_count]),
            commands: Mutex::new(Vec::new()),
        })
    }

    pub fn set_time(&self, index: usize, time: Duration) {
        self.times.lock().unwrap()[index] = time;
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn last_command(&self) -> Option<Command> {
        self.commands.lock().unwrap().last().copied()
    }
}

impl MediaPlayer for ScriptedPlayer {
    fn play(&self, index: usize) {
        self.commands.lock().unwrap().push(Command::Play(index));
    }

    fn pause(&self, index: usize) {
        self.commands.lock().unwrap().push(Command::Pause(index));
    }

    fn current_time(&self, index: usize) -> Duration {
        self.times.lock().unwrap()[index]
    }

    fn rewind(&self, index: usize) {
        self.commands.lock().unwrap().push(Command::Rewind(index));
        self.times.lock().unwrap()[index] = Duration::ZERO;
    }
}

pub fn registry(durations_secs: &[u64]) -> ClipRegistry {
    let clips = durations_secs
        .iter()
        .enumerate()
        .map(|(i, secs)| {
            ClipDescriptor::new(
                format!("clip-{i}"),
                format!("videos/clip-{i}.mp4"),
                Duration::from_secs(*secs),
            )
        })
        .collect();
    ClipRegistry::new(clips).unwrap()
}

pub fn spawn(durations_secs: &[u64]) -> (Arc<ScriptedPlayer>, CarouselHandle, JoinHandle<()>) {
    let player = ScriptedPlayer::new(durations_secs.len());
    let config = PlaybackConfig {
        tick_rate_hz: 50,
        ..PlaybackConfig::default()
    };
    let (coordinator, handle) =
        Coordinator::new(registry(durations_secs), player.clone(), &config, None);
    let task = coordinator.start();
    (player, handle, task)
}

pub async fn ready_and_start(handle: &CarouselHandle, clip_count: usize) {
    let transport = handle.transport();
    for i in 0..clip_count {
        transport.metadata_loaded(i).unwrap();
    }
    transport.viewport_entered().unwrap();
    handle.wait_for(|f| f.state.is_running()).await.unwrap();
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
