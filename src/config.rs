//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field has a default, so an empty file is a valid
//! configuration for a Maestro on `/dev/ttyACM0` with motors on channels 0
//! and 1.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::drive::controller::{DriveSettings, DEFAULT_ACCEL, DEFAULT_SPEED};
use crate::drive::scaler::{ChannelCalibration, DEFAULT_CENTER, DEFAULT_MAX, DEFAULT_MIN};
use crate::error::{DriveError, Result};
use crate::input::calibration::StickCalibration;
use crate::input::mapper::GamepadLayout;
use crate::input::Button;
use crate::maestro::protocol::MAX_DEVICE_NUMBER;
use crate::robot::DriveMode;

/// Baud rates supported by the Maestro TTL serial port
const SUPPORTED_BAUD_RATES: &[u32] = &[9600, 19200, 38400, 57600, 115200, 200000];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Maestro serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    /// Command port; empty auto-detects
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Selects the Pololu protocol addressed to this device number
    #[serde(default)]
    pub device_number: Option<u8>,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

/// Gamepad configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    /// evdev node; empty auto-detects
    #[serde(default)]
    pub device_path: String,

    #[serde(default)]
    pub layout: GamepadLayout,

    #[serde(default = "default_axis_min")]
    pub axis_min: i32,

    #[serde(default = "default_axis_max")]
    pub axis_max: i32,

    #[serde(default = "default_deadzone_stick")]
    pub deadzone_stick: f64,

    #[serde(default)]
    pub expo_steer: f64,

    #[serde(default)]
    pub expo_throttle: f64,

    #[serde(default)]
    pub invert_steer: bool,

    #[serde(default)]
    pub invert_throttle: bool,
}

/// Drive train configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DriveConfig {
    #[serde(default)]
    pub mode: DriveMode,

    #[serde(default = "default_left_channel")]
    pub left_channel: u8,

    #[serde(default = "default_right_channel")]
    pub right_channel: u8,

    /// Responsiveness: Maestro speed ramp
    #[serde(default = "default_speed")]
    pub speed: u16,

    #[serde(default = "default_accel")]
    pub accel: u16,

    #[serde(default)]
    pub left: CalibrationConfig,

    #[serde(default)]
    pub right: CalibrationConfig,
}

/// Raw min/center/max triple, validated by [`ChannelCalibration::new`]
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CalibrationConfig {
    #[serde(default = "default_min")]
    pub min: u16,

    #[serde(default = "default_center")]
    pub center: u16,

    #[serde(default = "default_max")]
    pub max: u16,
}

/// Control loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControlConfig {
    #[serde(default = "default_loop_rate_hz")]
    pub loop_rate_hz: u32,

    #[serde(default = "default_disable_button")]
    pub disable_button: Button,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for daily-rotated log files; empty logs to console only
    #[serde(default)]
    pub dir: String,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyACM0".to_string() }
fn default_baud_rate() -> u32 { 9600 }
fn default_timeout_ms() -> u64 { 100 }
fn default_reconnect_interval_ms() -> u64 { 1000 }

fn default_axis_min() -> i32 { -32768 }
fn default_axis_max() -> i32 { 32767 }
fn default_deadzone_stick() -> f64 { 0.05 }

fn default_left_channel() -> u8 { 0 }
fn default_right_channel() -> u8 { 1 }
fn default_speed() -> u16 { DEFAULT_SPEED }
fn default_accel() -> u16 { DEFAULT_ACCEL }

fn default_min() -> u16 { DEFAULT_MIN }
fn default_center() -> u16 { DEFAULT_CENTER }
fn default_max() -> u16 { DEFAULT_MAX }

fn default_loop_rate_hz() -> u32 { 50 }
fn default_disable_button() -> Button { Button::Back }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            device_number: None,
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            layout: GamepadLayout::default(),
            axis_min: default_axis_min(),
            axis_max: default_axis_max(),
            deadzone_stick: default_deadzone_stick(),
            expo_steer: 0.0,
            expo_throttle: 0.0,
            invert_steer: false,
            invert_throttle: false,
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            mode: DriveMode::default(),
            left_channel: default_left_channel(),
            right_channel: default_right_channel(),
            speed: default_speed(),
            accel: default_accel(),
            left: CalibrationConfig::default(),
            right: CalibrationConfig::default(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min: default_min(),
            center: default_center(),
            max: default_max(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            loop_rate_hz: default_loop_rate_hz(),
            disable_button: default_disable_button(),
        }
    }
}

impl CalibrationConfig {
    /// Build a validated channel calibration
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the triple is not ordered or exceeds the
    /// Maestro target range
    pub fn to_calibration(&self) -> Result<ChannelCalibration> {
        ChannelCalibration::new(self.min, self.center, self.max)
    }
}

impl DriveConfig {
    /// Build validated drive settings
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if a calibration, channel or ramp is invalid
    pub fn to_settings(&self) -> Result<DriveSettings> {
        let settings = DriveSettings::new(self.left_channel, self.right_channel)
            .with_calibration(self.left.to_calibration()?, self.right.to_calibration()?)
            .with_speed(self.speed)
            .with_accel(self.accel);
        settings.validate()?;
        Ok(settings)
    }
}

impl ControllerConfig {
    /// Stick shaping for the steering axis
    #[must_use]
    pub fn steer_calibration(&self) -> StickCalibration {
        StickCalibration::new(self.deadzone_stick, self.expo_steer)
    }

    /// Stick shaping for the throttle axis (and both tank axes)
    #[must_use]
    pub fn throttle_calibration(&self) -> StickCalibration {
        StickCalibration::new(self.deadzone_stick, self.expo_throttle)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use maestro_drive::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if any value is out of its valid range
    pub fn validate(&self) -> Result<()> {
        // Serial
        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {:?}",
                SUPPORTED_BAUD_RATES
            )));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if self.serial.reconnect_interval_ms == 0 || self.serial.reconnect_interval_ms > 60000 {
            return Err(invalid("reconnect_interval_ms must be between 1 and 60000"));
        }

        if let Some(n) = self.serial.device_number {
            if n > MAX_DEVICE_NUMBER {
                return Err(invalid(format!(
                    "device_number must be between 0 and {}",
                    MAX_DEVICE_NUMBER
                )));
            }
        }

        // Controller
        if self.controller.axis_min >= self.controller.axis_max {
            return Err(invalid("axis_min must be less than axis_max"));
        }

        if !(0.0..=0.25).contains(&self.controller.deadzone_stick) {
            return Err(invalid("deadzone_stick must be between 0.0 and 0.25"));
        }

        for (name, value) in [
            ("expo_steer", self.controller.expo_steer),
            ("expo_throttle", self.controller.expo_throttle),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{} must be between 0.0 and 1.0", name)));
            }
        }

        // Drive train
        self.drive.to_settings()?;

        // Control loop
        if self.control.loop_rate_hz == 0 || self.control.loop_rate_hz > 500 {
            return Err(invalid("loop_rate_hz must be between 1 and 500"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> DriveError {
    DriveError::Configuration(msg.into())
}
