//! # Input Module
//!
//! Gamepad input for driving the robot.
//!
//! This module handles:
//! - The [`InputDevice`] trait consumed by the robot loop
//! - Gamepad detection and event reading via evdev
//! - Mapping raw events into a [`mapper::GamepadState`]
//! - Applying deadzones and exponential curves to the sticks

pub mod calibration;
pub mod gamepad;
pub mod mapper;

use serde::Deserialize;

/// Analog stick axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

/// Gamepad buttons, named by position.
///
/// On an Xbox pad South/East/West/North are A/B/X/Y; on a DualSense they are
/// Cross/Circle/Square/Triangle. Back is Share on a DualSense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    South,
    East,
    West,
    North,
    Back,
    Start,
    Guide,
    LeftBumper,
    RightBumper,
    LeftThumb,
    RightThumb,
}

/// A source of normalized stick and button input.
pub trait InputDevice {
    /// Whether the device is currently delivering input.
    fn connected(&self) -> bool;

    /// Axis position in -1.0..=1.0. Stick up and stick right are positive.
    fn axis(&self, axis: Axis) -> f64;

    /// Whether a button is held.
    fn button(&self, button: Button) -> bool;
}
