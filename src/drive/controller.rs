//! # Drive Controller
//!
//! Owns the channel calibration of a two-motor drive train and issues motor
//! commands through a shared [`MotorDriver`].
//!
//! ## Stopping
//!
//! Motor authority is treated as a scoped resource. A [`DriveSession`] (and
//! the controller itself) commands both channels to center when released,
//! whether by [`DriveSession::finish`], an early return, `?` propagation or a
//! panic. A failed stop is attempted exactly once more before the failure is
//! reported.
//!
//! ## Usage
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use maestro_drive::drive::controller::{DriveController, DriveSettings};
//! use maestro_drive::maestro::Maestro;
//! use maestro_drive::maestro::protocol::MaestroProtocol;
//!
//! let maestro = Maestro::new(Vec::new(), MaestroProtocol::Compact, "memory");
//! let driver = Arc::new(Mutex::new(maestro));
//! let controller = DriveController::new(driver, DriveSettings::default())?;
//!
//! let session = controller.session();
//! let cmd = session.drive(1.0, 0.0)?; // full right turn in place
//! assert_eq!((cmd.left, cmd.right), (4000, 4000));
//! session.finish()?; // both channels back to 6000
//! # Ok::<(), maestro_drive::error::DriveError>(())
//! ```

use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use super::axis::AxisValue;
use super::mixer::{arcade_mix, MotorPowers};
use super::scaler::{scale_powers, ChannelCalibration, MotorCommand};
use crate::error::{DriveError, Result};
use crate::maestro::driver::{ChannelId, MotorDriver};
use crate::maestro::protocol::{MAESTRO_ACCEL_MAX, MAESTRO_MAX_CHANNELS, MAESTRO_VALUE_MAX};

/// Default speed ramp in Maestro speed units.
///
/// Low values damp acceleration and make the robot steadier, high values make
/// it more responsive but tippy. Values around 50 to 100 suit most robots.
pub const DEFAULT_SPEED: u16 = 60;

/// Default acceleration limit (0 = unlimited).
pub const DEFAULT_ACCEL: u16 = 0;

/// Immutable drive train configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveSettings {
    /// Channel of the left motor controller.
    pub left_channel: ChannelId,
    /// Channel of the right motor controller.
    pub right_channel: ChannelId,
    /// Left channel calibration.
    pub left: ChannelCalibration,
    /// Right channel calibration.
    pub right: ChannelCalibration,
    /// Speed ramp applied to both channels.
    pub speed: u16,
    /// Acceleration limit applied to both channels.
    pub accel: u16,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl DriveSettings {
    /// Settings for the given channels with default calibration and ramps.
    #[must_use]
    pub fn new(left_channel: ChannelId, right_channel: ChannelId) -> Self {
        Self {
            left_channel,
            right_channel,
            left: ChannelCalibration::default(),
            right: ChannelCalibration::default(),
            speed: DEFAULT_SPEED,
            accel: DEFAULT_ACCEL,
        }
    }

    #[must_use]
    pub fn with_calibration(mut self, left: ChannelCalibration, right: ChannelCalibration) -> Self {
        self.left = left;
        self.right = right;
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: u16) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_accel(mut self, accel: u16) -> Self {
        self.accel = accel;
        self
    }

    /// Checks channel ids and ramp values.
    ///
    /// Calibrations are validated when they are built.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if a channel is out of range, both sides share
    /// a channel, or a ramp value exceeds the Maestro limits.
    pub fn validate(&self) -> Result<()> {
        for (side, channel) in [("left", self.left_channel), ("right", self.right_channel)] {
            if channel >= MAESTRO_MAX_CHANNELS {
                return Err(DriveError::Configuration(format!(
                    "{} channel {} out of range (must be 0-{})",
                    side,
                    channel,
                    MAESTRO_MAX_CHANNELS - 1
                )));
            }
        }

        if self.left_channel == self.right_channel {
            return Err(DriveError::Configuration(format!(
                "left and right motors cannot share channel {}",
                self.left_channel
            )));
        }

        if self.speed > MAESTRO_VALUE_MAX {
            return Err(DriveError::Configuration(format!(
                "speed {} exceeds maximum {}",
                self.speed, MAESTRO_VALUE_MAX
            )));
        }

        if self.accel > MAESTRO_ACCEL_MAX {
            return Err(DriveError::Configuration(format!(
                "accel {} exceeds maximum {}",
                self.accel, MAESTRO_ACCEL_MAX
            )));
        }

        Ok(())
    }
}

/// Differential drive train on two controller channels.
///
/// Holds a shared handle to the driver; every command locks it once for both
/// channel writes, so concurrent callers never interleave left/right targets.
pub struct DriveController<D: MotorDriver> {
    driver: Arc<Mutex<D>>,
    settings: DriveSettings,
    closed: bool,
}

impl<D: MotorDriver> std::fmt::Debug for DriveController<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveController")
            .field("settings", &self.settings)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<D: MotorDriver> DriveController<D> {
    /// Validates the settings and configures ramps on both channels.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the settings are invalid
    /// - `Initialization` if the driver rejects the accel/speed setup
    pub fn new(driver: Arc<Mutex<D>>, settings: DriveSettings) -> Result<Self> {
        settings.validate()?;

        {
            let mut guard = lock_driver(&driver);
            for channel in [settings.left_channel, settings.right_channel] {
                guard
                    .set_accel(channel, settings.accel)
                    .and_then(|_| guard.set_speed(channel, settings.speed))
                    .map_err(|e| {
                        DriveError::Initialization(format!("channel {}: {}", channel, e))
                    })?;
            }
        }

        info!(
            "Drive train ready on channels {}/{} (speed {}, accel {})",
            settings.left_channel, settings.right_channel, settings.speed, settings.accel
        );

        Ok(Self {
            driver,
            settings,
            closed: false,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &DriveSettings {
        &self.settings
    }

    /// Scales motor powers to target units without sending them.
    ///
    /// Powers outside -1.0..=1.0 are clamped.
    #[must_use]
    pub fn scale(&self, left: f64, right: f64) -> MotorCommand {
        self.scale_powers(MotorPowers::new(left, right))
    }

    fn scale_powers(&self, powers: MotorPowers) -> MotorCommand {
        scale_powers(powers, &self.settings.left, &self.settings.right)
    }

    /// Arcade drive: mixes steering and throttle, then sends the targets.
    ///
    /// # Errors
    ///
    /// Returns `DriverWrite` if either channel write fails.
    pub fn drive(&self, steer: f64, throttle: f64) -> Result<MotorCommand> {
        let powers = arcade_mix(AxisValue::new(steer), AxisValue::new(throttle));
        self.send(self.scale_powers(powers))
    }

    /// Tank drive: sends left/right motor powers directly.
    ///
    /// # Errors
    ///
    /// Returns `DriverWrite` if either channel write fails.
    pub fn tank_drive(&self, left: f64, right: f64) -> Result<MotorCommand> {
        self.send(self.scale(left, right))
    }

    /// Commands both channels to their center (stopped) target.
    ///
    /// Both writes are attempted even if the first fails; the first failure
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns `DriverWrite` if either channel write fails.
    pub fn stop(&self) -> Result<MotorCommand> {
        let cmd = self.center_command();
        let mut driver = lock_driver(&self.driver);

        let left = driver.set_target(self.settings.left_channel, cmd.left);
        let right = driver.set_target(self.settings.right_channel, cmd.right);
        left.and(right)?;

        debug!("Motors stopped at {}/{}", cmd.left, cmd.right);
        Ok(cmd)
    }

    /// Starts a drive session that stops the motors when released.
    #[must_use]
    pub fn session(&self) -> DriveSession<'_, D> {
        info!("Drive session started");
        DriveSession {
            controller: self,
            released: false,
        }
    }

    /// Stops the motors and releases the controller.
    ///
    /// # Errors
    ///
    /// Returns the stop failure if the retry failed too.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.stop_with_retry().map(|_| ())
    }

    fn center_command(&self) -> MotorCommand {
        MotorCommand {
            left: self.settings.left.center(),
            right: self.settings.right.center(),
        }
    }

    fn send(&self, cmd: MotorCommand) -> Result<MotorCommand> {
        let mut driver = lock_driver(&self.driver);
        driver.set_target(self.settings.left_channel, cmd.left)?;
        driver.set_target(self.settings.right_channel, cmd.right)?;

        debug!("Motor targets {}/{}", cmd.left, cmd.right);
        Ok(cmd)
    }

    /// Stop, and on failure try exactly once more.
    fn stop_with_retry(&self) -> Result<MotorCommand> {
        match self.stop() {
            Ok(cmd) => Ok(cmd),
            Err(first) => {
                warn!("Stop failed ({}), retrying once", first);
                self.stop()
            }
        }
    }
}

impl<D: MotorDriver> Drop for DriveController<D> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.stop_with_retry() {
            error!("Failed to stop motors while dropping drive controller: {}", e);
        }
    }
}

/// Scoped authority over the drive train.
///
/// Derefs to the [`DriveController`]. Releasing the session, explicitly or by
/// drop, commands both motors to center.
pub struct DriveSession<'a, D: MotorDriver> {
    controller: &'a DriveController<D>,
    released: bool,
}

impl<D: MotorDriver> DriveSession<'_, D> {
    /// Ends the session, stopping the motors.
    ///
    /// # Errors
    ///
    /// Returns the stop failure if the retry failed too.
    pub fn finish(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        info!("Stopping robot");
        self.controller.stop_with_retry().map(|_| ())
    }
}

impl<D: MotorDriver> Deref for DriveSession<'_, D> {
    type Target = DriveController<D>;

    fn deref(&self) -> &Self::Target {
        self.controller
    }
}

impl<D: MotorDriver> Drop for DriveSession<'_, D> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.release() {
            error!("Failed to stop motors at end of drive session: {}", e);
        }
    }
}

/// Locks the shared driver, recovering from poisoning so a stop can always be
/// issued after a panic elsewhere.
fn lock_driver<D>(driver: &Mutex<D>) -> MutexGuard<'_, D> {
    driver.lock().unwrap_or_else(PoisonError::into_inner)
}
