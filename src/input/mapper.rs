//! # Gamepad Event Mapper Module
//!
//! Parses raw evdev events into a structured [`GamepadState`].
//!
//! ## Axis Codes (EV_ABS)
//!
//! | Stick | Xbox layout | DualSense layout |
//! |-------|-------------|------------------|
//! | Left X / Y | ABS_X / ABS_Y | ABS_X / ABS_Y |
//! | Right X / Y | ABS_RX / ABS_RY | ABS_Z / ABS_RZ |
//!
//! Raw readings are normalized to -1.0..=1.0 using the configured raw range.
//! Y axes keep the evdev sense (up is negative); [`super::gamepad::GamepadInput`]
//! flips them.
//!
//! ## Button Codes (EV_KEY)
//!
//! | Button | evdev Code |
//! |--------|------------|
//! | South / East / West / North | BTN_SOUTH / BTN_EAST / BTN_WEST / BTN_NORTH |
//! | Back (Share) | BTN_SELECT |
//! | Start (Options) | BTN_START |
//! | Guide (PS) | BTN_MODE |
//! | Bumpers | BTN_TL / BTN_TR |
//! | Stick clicks | BTN_THUMBL / BTN_THUMBR |

use evdev::{AbsoluteAxisType, InputEvent, Key};
use serde::Deserialize;

use super::calibration::normalize_axis;
use super::Button;

/// Axis code assignment of a gamepad family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamepadLayout {
    /// Xbox and most XInput-style pads.
    #[default]
    Xbox,
    /// PS5 DualSense.
    #[serde(rename = "dualsense")]
    DualSense,
}

impl GamepadLayout {
    fn right_stick_axes(self) -> (AbsoluteAxisType, AbsoluteAxisType) {
        match self {
            Self::Xbox => (AbsoluteAxisType::ABS_RX, AbsoluteAxisType::ABS_RY),
            Self::DualSense => (AbsoluteAxisType::ABS_Z, AbsoluteAxisType::ABS_RZ),
        }
    }
}

/// Snapshot of a gamepad.
///
/// Stick values are normalized (-1.0 to 1.0) but not yet shaped by deadzone
/// or expo.
///
/// # Examples
///
/// ```
/// use maestro_drive::input::mapper::GamepadState;
/// use maestro_drive::input::Button;
///
/// let state = GamepadState::default();
/// assert!(!state.connected);
/// assert_eq!(state.left_stick_x, 0.0);
/// assert!(!state.button(Button::Back));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GamepadState {
    /// Whether the device is delivering events.
    pub connected: bool,

    // Analog sticks
    pub left_stick_x: f64,
    pub left_stick_y: f64,
    pub right_stick_x: f64,
    pub right_stick_y: f64,

    // Face buttons
    pub btn_south: bool,
    pub btn_east: bool,
    pub btn_west: bool,
    pub btn_north: bool,

    // System buttons
    pub btn_back: bool,
    pub btn_start: bool,
    pub btn_guide: bool,

    // Shoulder buttons
    pub btn_left_bumper: bool,
    pub btn_right_bumper: bool,

    // Stick clicks
    pub btn_left_thumb: bool,
    pub btn_right_thumb: bool,
}

impl GamepadState {
    /// Whether `button` is held.
    #[must_use]
    pub fn button(&self, button: Button) -> bool {
        match button {
            Button::South => self.btn_south,
            Button::East => self.btn_east,
            Button::West => self.btn_west,
            Button::North => self.btn_north,
            Button::Back => self.btn_back,
            Button::Start => self.btn_start,
            Button::Guide => self.btn_guide,
            Button::LeftBumper => self.btn_left_bumper,
            Button::RightBumper => self.btn_right_bumper,
            Button::LeftThumb => self.btn_left_thumb,
            Button::RightThumb => self.btn_right_thumb,
        }
    }

    fn button_mut(&mut self, key: Key) -> Option<&mut bool> {
        let field = match key {
            Key::BTN_SOUTH => &mut self.btn_south,
            Key::BTN_EAST => &mut self.btn_east,
            Key::BTN_WEST => &mut self.btn_west,
            Key::BTN_NORTH => &mut self.btn_north,
            Key::BTN_SELECT => &mut self.btn_back,
            Key::BTN_START => &mut self.btn_start,
            Key::BTN_MODE => &mut self.btn_guide,
            Key::BTN_TL => &mut self.btn_left_bumper,
            Key::BTN_TR => &mut self.btn_right_bumper,
            Key::BTN_THUMBL => &mut self.btn_left_thumb,
            Key::BTN_THUMBR => &mut self.btn_right_thumb,
            _ => return None,
        };
        Some(field)
    }
}

/// Parses raw evdev events and maintains gamepad state.
///
/// Not thread-safe; owned by the single task reading the device.
///
/// # Examples
///
/// ```
/// use maestro_drive::input::mapper::{EventMapper, GamepadLayout};
///
/// let mapper = EventMapper::new(GamepadLayout::Xbox, -32768, 32767);
/// assert!(mapper.state().connected);
/// ```
#[derive(Debug)]
pub struct EventMapper {
    state: GamepadState,
    layout: GamepadLayout,
    axis_min: i32,
    axis_max: i32,
}

impl EventMapper {
    /// Creates a mapper for a connected device with centered sticks.
    #[must_use]
    pub fn new(layout: GamepadLayout, axis_min: i32, axis_max: i32) -> Self {
        Self {
            state: GamepadState {
                connected: true,
                ..GamepadState::default()
            },
            layout,
            axis_min,
            axis_max,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GamepadState {
        &self.state
    }

    /// Returns a clone of the current state.
    #[must_use]
    pub fn state_snapshot(&self) -> GamepadState {
        self.state.clone()
    }

    /// Processes a single evdev input event and updates internal state.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event.kind() {
            evdev::InputEventKind::AbsAxis(axis) => {
                self.process_axis_event(axis, event.value());
            }
            evdev::InputEventKind::Key(key) => {
                if let Some(field) = self.state.button_mut(key) {
                    *field = event.value() != 0;
                }
            }
            _ => {
                // Ignore sync events and other event types
            }
        }
    }

    fn process_axis_event(&mut self, axis: AbsoluteAxisType, raw: i32) {
        let value = normalize_axis(raw, self.axis_min, self.axis_max);
        let (right_x, right_y) = self.layout.right_stick_axes();

        if axis == AbsoluteAxisType::ABS_X {
            self.state.left_stick_x = value;
        } else if axis == AbsoluteAxisType::ABS_Y {
            self.state.left_stick_y = value;
        } else if axis == right_x {
            self.state.right_stick_x = value;
        } else if axis == right_y {
            self.state.right_stick_y = value;
        }
        // Triggers, d-pad and motion sensors are ignored
    }

    /// Resets sticks and buttons, keeping the connection flag.
    pub fn reset(&mut self) {
        self.state = GamepadState {
            connected: self.state.connected,
            ..GamepadState::default()
        };
    }
}
