//! # Robot Loop
//!
//! Turns one reading of an [`InputDevice`] into one drive command.
//!
//! ## Per-tick behavior
//!
//! | Input state | Action |
//! |-------------|--------|
//! | Disconnected | `stop()` |
//! | Disable button held | nothing sent, [`Step::Disabled`] |
//! | Connected, arcade | `drive(LeftX, LeftY)` |
//! | Connected, tank | `tank_drive(LeftY, -RightY)` |
//!
//! The caller owns timing and the [`crate::drive::DriveSession`] that stops
//! the motors once the loop ends.

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::drive::controller::DriveController;
use crate::drive::scaler::MotorCommand;
use crate::error::Result;
use crate::input::{Axis, Button, InputDevice};
use crate::maestro::driver::MotorDriver;

/// How stick input maps to the two motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// One stick: X steers, Y throttles.
    #[default]
    Arcade,
    /// Left stick Y drives the left wheel, right stick Y the right wheel.
    ///
    /// Sticks are wheel speeds, forward positive. The right motor is mounted
    /// mirrored, so the right stick is negated into channel terms before
    /// `tank_drive`; both sticks up drives straight like arcade full throttle.
    Tank,
}

/// Outcome of a single loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Targets sent from stick input.
    Driving(MotorCommand),
    /// Input lost; motors commanded to center.
    Stopped(MotorCommand),
    /// Disable button pressed; the loop should end.
    Disabled,
}

/// Input handling options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotSettings {
    pub mode: DriveMode,
    pub invert_steer: bool,
    pub invert_throttle: bool,
    pub disable_button: Button,
}

impl Default for RobotSettings {
    fn default() -> Self {
        Self {
            mode: DriveMode::Arcade,
            invert_steer: false,
            invert_throttle: false,
            disable_button: Button::Back,
        }
    }
}

impl RobotSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.drive.mode,
            invert_steer: config.controller.invert_steer,
            invert_throttle: config.controller.invert_throttle,
            disable_button: config.control.disable_button,
        }
    }
}

/// Stateless mapping from input to drive commands.
#[derive(Debug, Clone, Default)]
pub struct RobotLoop {
    settings: RobotSettings,
}

impl RobotLoop {
    #[must_use]
    pub fn new(settings: RobotSettings) -> Self {
        info!(
            "Robot loop configured: {:?} mode, disable on {:?}",
            settings.mode, settings.disable_button
        );
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &RobotSettings {
        &self.settings
    }

    /// Runs one tick.
    ///
    /// # Errors
    ///
    /// Returns `DriverWrite` if a motor write fails.
    pub fn step<D, I>(&self, controller: &DriveController<D>, input: &I) -> Result<Step>
    where
        D: MotorDriver,
        I: InputDevice + ?Sized,
    {
        if !input.connected() {
            debug!("Input disconnected, stopping");
            return controller.stop().map(Step::Stopped);
        }

        if input.button(self.settings.disable_button) {
            info!("Disable button pressed");
            return Ok(Step::Disabled);
        }

        let cmd = match self.settings.mode {
            DriveMode::Arcade => {
                let steer = invert(input.axis(Axis::LeftX), self.settings.invert_steer);
                let throttle = invert(input.axis(Axis::LeftY), self.settings.invert_throttle);
                controller.drive(steer, throttle)?
            }
            DriveMode::Tank => {
                let left = invert(input.axis(Axis::LeftY), self.settings.invert_throttle);
                let right = invert(input.axis(Axis::RightY), self.settings.invert_throttle);
                // wheel frame to channel frame
                controller.tank_drive(left, -right)?
            }
        };
        Ok(Step::Driving(cmd))
    }
}

#[inline]
fn invert(value: f64, inverted: bool) -> f64 {
    if inverted {
        -value
    } else {
        value
    }
}
