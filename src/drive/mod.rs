//! # Drive Module
//!
//! Differential-drive mixing and signal scaling.
//!
//! This module handles:
//! - Normalized axis values clamped to -1.0..=1.0
//! - Arcade mixing of steering and throttle into motor powers
//! - Scaling motor powers to per-channel calibrated target units
//! - Issuing targets through the motor driver, with guaranteed stop on release

pub mod axis;
pub mod controller;
pub mod mixer;
pub mod scaler;

pub use axis::AxisValue;
pub use controller::{DriveController, DriveSession, DriveSettings};
pub use mixer::{arcade_mix, MotorPowers};
pub use scaler::{ChannelCalibration, MotorCommand};
