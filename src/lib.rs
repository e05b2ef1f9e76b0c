//! # Maestro Drive Library
//!
//! Drive a two-motor robot with a gamepad through a Pololu Maestro servo
//! controller.
//!
//! Stick input is mixed into left/right motor powers (arcade drive), scaled
//! through per-channel calibration into Maestro target units and written to
//! the Maestro over its serial command port.

pub mod config;
pub mod drive;
pub mod error;
pub mod input;
pub mod maestro;
pub mod robot;
