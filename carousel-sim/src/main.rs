mod bridge;
mod config;
mod error;
mod player;

use crate::bridge::{run_bridge, BridgeOptions};
use crate::config::{SimulationConfig, CONFIG_TEMPLATE as SIMULATION_CONFIG_TEMPLATE};
use crate::error::SimError;
use crate::player::SimulatedPlayer;
use carousel_core::{
    CarouselConfig, ClipRegistry, CoreError, Coordinator, MediaBackend, TomlParseError,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    // An explicit path may be given as the only argument
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(CarouselConfig::config_path, PathBuf::from);

    // Check config for logging.enabled before full config load
    let file_logging_enabled = check_file_logging_enabled(&config_path);
    init_tracing(file_logging_enabled);

    // Pass the simulator's section to include in the generated config file
    let extra_templates: &[&str] = &[SIMULATION_CONFIG_TEMPLATE];
    let config = match CarouselConfig::load_or_create_at(&config_path, Some(extra_templates)) {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            info!("Created config template at {}", path.display());
            info!("Edit the [[clips]] list and run again");
            std::process::exit(0);
        }
        Err(CoreError::ConfigParseError(parse_error)) => {
            report_parse_error(&parse_error, &config_path);
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    // Set up Ctrl+C handler to trigger graceful shutdown
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    if let Err(e) = runtime.block_on(run(config, cancel_token)) {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(config: CarouselConfig, cancel_token: CancellationToken) -> Result<(), SimError> {
    let registry = ClipRegistry::from_config(&config.clips)?;
    let simulation = SimulationConfig::from_config(&config)?;
    simulation.validate(registry.len())?;

    info!(
        "Loaded {} clip(s): {:?}",
        registry.len(),
        registry.iter().map(|c| c.id.as_str()).collect::<Vec<_>>()
    );

    let player = Arc::new(SimulatedPlayer::new(
        &registry,
        &simulation,
        Some(cancel_token.child_token()),
    ));
    let (coordinator, handle) = Coordinator::new(
        registry,
        player.clone(),
        &config.playback,
        Some(cancel_token.clone()),
    );
    let coordinator_task = coordinator.start();

    let backend_transport = handle.transport();
    let backend = player.clone();
    let backend_task = tokio::spawn(async move {
        if let Err(e) = backend.run(backend_transport).await {
            error!("Media backend {} stopped with error: {}", backend.name(), e);
        }
    });

    let transport = handle.transport();
    if config.playback.autostart {
        // The carousel is on screen from the start
        transport.viewport_entered()?;
    } else {
        info!("Autostart disabled, pressing play");
        transport.request_play_pause()?;
    }

    let options = BridgeOptions {
        replays: simulation.replays,
        dump_frames: simulation.dump_frames,
    };
    let bridge_result = run_bridge(handle.clone(), options).await;

    handle.stop();
    player.stop();
    if let Err(e) = coordinator_task.await {
        warn!("Coordinator task failed: {e}");
    }
    if let Err(e) = backend_task.await {
        warn!("Media backend task failed: {e}");
    }

    bridge_result
}

fn report_parse_error(parse_error: &TomlParseError, path: &Path) {
    error!("Failed to parse {}:", path.display());
    for line in parse_error.to_string().lines() {
        error!("  {line}");
    }
}

/// Check if file logging is enabled by reading config directly.
/// Called before tracing is set up, so failures are silent.
fn check_file_logging_enabled(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| toml::from_str::<toml::Table>(&content).ok())
        .and_then(|table| {
            table
                .get("logging")
                .and_then(|logging| logging.get("enabled"))
                .and_then(toml::Value::as_bool)
        })
        .unwrap_or(false)
}

/// Open a fresh log file, creating its directory first.
fn create_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    File::create(path)
}

fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer();

    if file_logging_enabled {
        let log_path = carousel_core::log_file_path();

        match create_log_file(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
