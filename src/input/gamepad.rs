//! # Gamepad Module
//!
//! Gamepad detection, connection, and input reading using the Linux evdev
//! interface.
//!
//! ## Gamepad Detection
//!
//! A device is treated as a gamepad when it reports:
//! - The `BTN_SOUTH` key (A on Xbox, Cross on DualSense)
//! - The `ABS_X` absolute axis (left stick)
//!
//! ## Reading
//!
//! [`Gamepad::into_input`] moves the device into a background task that maps
//! its events and publishes a [`GamepadState`] after every `SYN_REPORT`. The
//! robot loop reads the latest published state through [`GamepadInput`]
//! without waiting on the device.

use evdev::{AbsoluteAxisType, Device, EventType, InputEvent, Key};
use std::path::Path;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::calibration::StickCalibration;
use super::mapper::{EventMapper, GamepadState};
use super::{Axis, Button, InputDevice};
use crate::config::ControllerConfig;
use crate::error::{DriveError, Result};

/// Directory scanned for event devices
const INPUT_DIR: &str = "/dev/input";

/// Gamepad handle
///
/// Represents an open evdev gamepad that has not yet started streaming.
pub struct Gamepad {
    device: Device,
    device_path: String,
}

impl std::fmt::Debug for Gamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gamepad")
            .field("device_path", &self.device_path)
            .field("name", &self.name())
            .finish()
    }
}

impl Gamepad {
    /// Open the configured gamepad, or the first one found
    ///
    /// With an empty `device_path`, scans all `/dev/input/event*` devices in
    /// sorted order and opens the first that looks like a gamepad.
    ///
    /// # Errors
    ///
    /// - `ControllerNotFound`: No gamepad found on the system
    /// - `Controller`: The configured device cannot be opened or is not a gamepad
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use maestro_drive::config::ControllerConfig;
    /// use maestro_drive::input::gamepad::Gamepad;
    ///
    /// let gamepad = Gamepad::open(&ControllerConfig::default())?;
    /// println!("Connected to gamepad at: {}", gamepad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(config: &ControllerConfig) -> Result<Self> {
        if config.device_path.is_empty() {
            Self::scan(Path::new(INPUT_DIR))
        } else {
            Self::open_path(Path::new(&config.device_path))
        }
    }

    fn open_path(path: &Path) -> Result<Self> {
        let device = Device::open(path).map_err(|e| {
            DriveError::Controller(format!("Failed to open {}: {}", path.display(), e))
        })?;

        if !is_gamepad(&device) {
            return Err(DriveError::Controller(format!(
                "{} is not a gamepad",
                path.display()
            )));
        }

        let device_path = path.to_string_lossy().to_string();
        info!("Opened gamepad at: {}", device_path);
        Ok(Self {
            device,
            device_path,
        })
    }

    fn scan(input_dir: &Path) -> Result<Self> {
        if !input_dir.exists() {
            return Err(DriveError::Controller(format!(
                "{} directory not found",
                input_dir.display()
            )));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| {
                DriveError::Controller(format!("Failed to read {}: {}", input_dir.display(), e))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DriveError::Controller(format!("Failed to read directory entry: {}", e)))?;

        // Deterministic pick when several gamepads are connected
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            let is_event_node = path
                .file_name()
                .map(|name| name.to_string_lossy().starts_with("event"))
                .unwrap_or(false);
            if !is_event_node {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Found input device: {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );

                    if is_gamepad(&device) {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found gamepad at: {}", device_path);
                        return Ok(Self {
                            device,
                            device_path,
                        });
                    }
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(DriveError::ControllerNotFound)
    }

    /// Get the device path of this gamepad
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Human-readable device name reported by the kernel
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Start streaming events into a [`GamepadInput`]
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Controller` if the device cannot be switched to async reads.
    pub fn into_input(self, config: &ControllerConfig) -> Result<GamepadInput> {
        let device_path = self.device_path;
        let mut stream = self.device.into_event_stream().map_err(|e| {
            DriveError::Controller(format!("Failed to stream {}: {}", device_path, e))
        })?;

        let mut mapper = EventMapper::new(config.layout, config.axis_min, config.axis_max);
        let (tx, rx) = watch::channel(mapper.state_snapshot());

        let task = tokio::spawn(async move {
            loop {
                match stream.next_event().await {
                    Ok(event) => {
                        apply_event(&mut mapper, &tx, &event);
                        if tx.is_closed() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Gamepad {} disconnected: {}", device_path, e);
                        tx.send_modify(|state| state.connected = false);
                        break;
                    }
                }
            }
            debug!("Gamepad reader for {} finished", device_path);
        });

        let mut input = GamepadInput::new(rx, config);
        input.task = Some(task);
        Ok(input)
    }
}

fn is_gamepad(device: &Device) -> bool {
    let has_south = device
        .supported_keys()
        .map(|keys| keys.contains(Key::BTN_SOUTH))
        .unwrap_or(false);
    let has_stick = device
        .supported_absolute_axes()
        .map(|axes| axes.contains(AbsoluteAxisType::ABS_X))
        .unwrap_or(false);
    has_south && has_stick
}

/// Feed one event to the mapper, publishing on each completed report
fn apply_event(mapper: &mut EventMapper, tx: &watch::Sender<GamepadState>, event: &InputEvent) {
    if event.event_type() == EventType::SYNCHRONIZATION {
        tx.send_replace(mapper.state_snapshot());
    } else {
        mapper.process_event(event);
    }
}

/// Latest gamepad state with stick shaping applied
///
/// Y axes are flipped so that pushing a stick up reads positive.
#[derive(Debug)]
pub struct GamepadInput {
    state: watch::Receiver<GamepadState>,
    steer: StickCalibration,
    throttle: StickCalibration,
    task: Option<JoinHandle<()>>,
}

impl GamepadInput {
    /// Wrap a state channel, shaping sticks per `config`
    pub fn new(state: watch::Receiver<GamepadState>, config: &ControllerConfig) -> Self {
        Self {
            state,
            steer: config.steer_calibration(),
            throttle: config.throttle_calibration(),
            task: None,
        }
    }

    /// An input that never connects
    ///
    /// Stands in while no gamepad is present so the robot loop keeps
    /// commanding a stop.
    pub fn disconnected(config: &ControllerConfig) -> Self {
        let (_tx, rx) = watch::channel(GamepadState::default());
        Self::new(rx, config)
    }

    /// Latest published state, unshaped
    pub fn snapshot(&self) -> GamepadState {
        self.state.borrow().clone()
    }
}

impl InputDevice for GamepadInput {
    fn connected(&self) -> bool {
        self.state.borrow().connected
    }

    fn axis(&self, axis: Axis) -> f64 {
        let state = self.state.borrow();
        match axis {
            Axis::LeftX => self.steer.apply(state.left_stick_x),
            Axis::LeftY => self.throttle.apply(-state.left_stick_y),
            Axis::RightX => self.steer.apply(state.right_stick_x),
            Axis::RightY => self.throttle.apply(-state.right_stick_y),
        }
    }

    fn button(&self, button: Button) -> bool {
        self.state.borrow().button(button)
    }
}

impl Drop for GamepadInput {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
