//! CLI interface for Catcam.
//!
//! - `catcam run` (the default): record on motion until SIGINT/SIGTERM.
//! - `catcam check`: validate the config and show what would be launched.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

use clap::{Parser, Subcommand};
use jiff::Zoned;
use tracing::info;

use crate::camera::{Capture, Launcher};
use crate::config::Config;
use crate::control::{self, Controller};
use crate::motion::MotionSensor;
use crate::rollover::SystemClock;

/// Catcam: motion-triggered video recording.
#[derive(Debug, Parser)]
#[command(name = "catcam", version)]
pub struct Cli {
    /// Config file (defaults to `~/.catcam/config.toml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Watch the motion sensor and record until interrupted.
    Run,

    /// Validate the config, print it as JSON, and show the capture command
    /// line the next session would use.
    Check,
}

/// Run the selected command, returning an error message on failure.
pub fn run(command: Command, config: &Config) -> Result<(), String> {
    match command {
        Command::Run => cmd_run(config),
        Command::Check => cmd_check(config),
    }
}

fn cmd_run(config: &Config) -> Result<(), String> {
    fs::create_dir_all(&config.store_path).map_err(|e| {
        format!(
            "failed to create store path {}: {e}",
            config.store_path.display()
        )
    })?;

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        // The loop may already be gone; a second request has nothing to do.
        let _ = tx.send(());
    })
    .map_err(|e| format!("failed to install signal handler: {e}"))?;

    // Sensor first: if it can't be opened, no capture process is left behind.
    let mut sensor = open_sensor(config)?;

    let capture: Arc<dyn Capture> = Arc::new(Launcher::new(config.capture_command()));
    let controller = Controller::start(
        capture,
        Arc::new(SystemClock),
        config.naming(),
        config.idle_timeout_secs,
    )
    .map_err(|e| format!("failed to start recording session: {e}"))?;
    let controller = Arc::new(controller);

    info!(
        idle_timeout_secs = config.idle_timeout_secs,
        output = ?controller.output(),
        "motion detector started"
    );

    control::run(&controller, sensor.as_mut(), &rx)
        .map_err(|e| format!("motion sensor failed: {e}"))
}

fn cmd_check(config: &Config) -> Result<(), String> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| format!("failed to serialize config: {e}"))?;
    println!("{json}");

    let output = config
        .naming()
        .output_path(&Zoned::now())
        .map_err(|e| e.to_string())?;
    eprintln!(
        "Next session: {}",
        config.capture_command().command_line(&output)
    );

    Ok(())
}

#[cfg(feature = "gpio")]
fn open_sensor(config: &Config) -> Result<Box<dyn MotionSensor>, String> {
    let sensor = crate::motion::GpioSensor::open(config.motion_pin)
        .map_err(|e| format!("failed to open motion sensor on pin {}: {e}", config.motion_pin))?;
    Ok(Box::new(sensor))
}

#[cfg(not(feature = "gpio"))]
fn open_sensor(_config: &Config) -> Result<Box<dyn MotionSensor>, String> {
    Err("built without GPIO support; rebuild with `--features gpio`".to_string())
}
