//! # Maestro Drive
//!
//! Drive a two-motor robot with a gamepad through a Pololu Maestro.
//!
//! ```bash
//! maestro-drive [config.toml]
//! ```
//!
//! Without an argument the configuration is read from `config/default.toml`,
//! falling back to built-in defaults when that file does not exist.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use maestro_drive::config::{Config, ControllerConfig, LoggingConfig};
use maestro_drive::drive::controller::DriveController;
use maestro_drive::input::gamepad::{Gamepad, GamepadInput};
use maestro_drive::input::InputDevice;
use maestro_drive::maestro::driver::MotorDriver;
use maestro_drive::maestro::Maestro;
use maestro_drive::robot::{RobotLoop, RobotSettings, Step};

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix of the daily-rotated log
const LOG_FILE_PREFIX: &str = "maestro-drive.log";

/// Number of loop ticks between status log messages
const LOG_INTERVAL_TICKS: u64 = 500;

/// Main entry point
///
/// # Control Flow
///
/// 1. Load configuration and set up logging
/// 2. Open the Maestro and configure the motor channels
/// 3. Open the gamepad, retrying while it is absent
/// 4. Run the robot loop at `loop_rate_hz` until the disable button or Ctrl+C
/// 5. Stop both motors and release the Maestro
///
/// # Errors
///
/// Returns error if the configuration is invalid, the Maestro cannot be
/// opened or configured, or a motor write fails.
#[tokio::main]
async fn main() -> Result<()> {
    let config_arg = std::env::args().nth(1);
    let (config, config_source) = load_config(config_arg.as_deref())?;

    let _log_guard = init_logging(&config.logging)?;

    info!("Maestro Drive v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", config_source);

    let maestro = Maestro::open(&config.serial)?;
    info!("Maestro command port opened at: {}", maestro.device_path());

    let driver = Arc::new(Mutex::new(maestro));
    let settings = config.drive.to_settings()?;
    let controller = DriveController::new(driver, settings)?;
    let robot = RobotLoop::new(RobotSettings::from_config(&config));

    let outcome = run(&controller, &robot, &config).await;
    let closed = controller.close().context("failed to stop motors");

    finish_shutdown(outcome, closed)
}

/// Combine the loop result with the final stop
///
/// A loop error wins; a close failure alongside it is logged, not returned.
fn finish_shutdown(outcome: Result<()>, closed: Result<()>) -> Result<()> {
    match (outcome, closed) {
        (Err(loop_error), Err(close_error)) => {
            error!("{:#}", close_error);
            Err(loop_error)
        }
        (Err(loop_error), Ok(())) => Err(loop_error),
        (Ok(()), closed) => {
            closed?;
            info!("Shutdown complete");
            Ok(())
        }
    }
}

/// Runs the robot loop inside a drive session
async fn run<D: MotorDriver>(
    controller: &DriveController<D>,
    robot: &RobotLoop,
    config: &Config,
) -> Result<()> {
    let reconnect_interval = Duration::from_millis(config.serial.reconnect_interval_ms);
    let mut input = connect_gamepad(&config.controller);
    let mut last_attempt = Instant::now();

    let period = Duration::from_secs_f64(1.0 / f64::from(config.control.loop_rate_hz));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let session = controller.session();
    info!("Robot loop started at {}Hz", config.control.loop_rate_hz);
    info!("Press {:?} or Ctrl+C to exit", robot.settings().disable_button);

    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !input.connected() && last_attempt.elapsed() >= reconnect_interval {
                    last_attempt = Instant::now();
                    if let Some(reconnected) = try_connect_gamepad(&config.controller) {
                        input = reconnected;
                    }
                }

                match robot.step(&*session, &input)? {
                    Step::Disabled => break,
                    Step::Driving(cmd) | Step::Stopped(cmd) => {
                        ticks += 1;
                        if ticks % LOG_INTERVAL_TICKS == 0 {
                            info!(
                                "Tick {}: targets {}/{} (gamepad {})",
                                ticks,
                                cmd.left,
                                cmd.right,
                                if input.connected() { "connected" } else { "disconnected" }
                            );
                        }
                    }
                }
            }

            _ = &mut shutdown => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    info!("Robot loop finished after {} ticks", ticks);
    session.finish()?;
    Ok(())
}

/// Open the gamepad now, or return an input that reads as disconnected
fn connect_gamepad(config: &ControllerConfig) -> GamepadInput {
    try_connect_gamepad(config).unwrap_or_else(|| {
        warn!("No gamepad available, motors held at center until one connects");
        GamepadInput::disconnected(config)
    })
}

fn try_connect_gamepad(config: &ControllerConfig) -> Option<GamepadInput> {
    let opened = Gamepad::open(config).and_then(|gamepad| {
        info!(
            "Gamepad connected: {} ({})",
            gamepad.name().unwrap_or("unnamed"),
            gamepad.device_path()
        );
        gamepad.into_input(config)
    });

    match opened {
        Ok(input) => Some(input),
        Err(e) => {
            debug!("Gamepad unavailable: {}", e);
            None
        }
    }
}

/// Load the configuration named on the command line, or the default file
///
/// Returns the configuration and a description of where it came from.
fn load_config(arg: Option<&str>) -> Result<(Config, String)> {
    match arg {
        Some(path) => {
            let config = Config::load(path).with_context(|| format!("failed to load {}", path))?;
            Ok((config, path.to_string()))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            let config = Config::load(DEFAULT_CONFIG_PATH)
                .with_context(|| format!("failed to load {}", DEFAULT_CONFIG_PATH))?;
            Ok((config, DEFAULT_CONFIG_PATH.to_string()))
        }
        None => Ok((Config::default(), "built-in defaults".to_string())),
    }
}

/// Install the tracing subscriber
///
/// Console output is always on. When `dir` is set, a daily-rotated file is
/// written as well; the returned guard flushes it and must be held until exit.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    if config.dir.is_empty() {
        registry.try_init().context("failed to install logger")?;
        return Ok(None);
    }

    std::fs::create_dir_all(&config.dir)
        .with_context(|| format!("failed to create log directory {}", config.dir))?;
    let appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    registry
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("failed to install logger")?;
    Ok(Some(guard))
}
