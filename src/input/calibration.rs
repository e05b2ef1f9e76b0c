//! # Stick Calibration Module
//!
//! Applies deadzones and exponential curves to stick inputs.
//!
//! ## Deadzone
//!
//! A deadzone eliminates small stick movements near center so a resting stick
//! never creeps the robot. Values within the deadzone map to 0.0, values
//! outside are scaled to use the full range.
//!
//! ## Exponential Curves
//!
//! Expo curves make small stick movements less sensitive while keeping full
//! deflection at the endpoints, giving finer control at low speed.
//!
//! The formula used is: `output = (1 - expo) * input + expo * input³`
//!
//! ## Usage
//!
//! ```
//! use maestro_drive::input::calibration::StickCalibration;
//!
//! let cal = StickCalibration::new(0.05, 0.3); // 5% deadzone, 0.3 expo
//!
//! // Input near center (within deadzone)
//! assert_eq!(cal.apply(0.02), 0.0);
//!
//! // Input at full deflection
//! assert!((cal.apply(1.0) - 1.0).abs() < 0.001);
//! ```

/// Applies deadzone and exponential curve to a normalized input.
///
/// Input and output are in the range -1.0 to 1.0, where 0.0 is center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickCalibration {
    /// Deadzone as a fraction (0.0 to 0.25).
    deadzone: f64,
    /// Exponential curve factor (0.0 to 1.0).
    expo: f64,
}

impl Default for StickCalibration {
    fn default() -> Self {
        Self {
            deadzone: 0.05,
            expo: 0.0,
        }
    }
}

impl StickCalibration {
    /// Creates a new calibration with specified deadzone and expo.
    ///
    /// Values outside their ranges are clamped.
    #[must_use]
    pub fn new(deadzone: f64, expo: f64) -> Self {
        Self {
            deadzone: deadzone.clamp(0.0, 0.25),
            expo: expo.clamp(0.0, 1.0),
        }
    }

    /// Creates a linear calibration (no deadzone, no expo).
    #[must_use]
    pub fn linear() -> Self {
        Self {
            deadzone: 0.0,
            expo: 0.0,
        }
    }

    #[must_use]
    pub fn deadzone(&self) -> f64 {
        self.deadzone
    }

    #[must_use]
    pub fn expo(&self) -> f64 {
        self.expo
    }

    /// Applies deadzone and expo curve to a normalized input.
    ///
    /// ```
    /// use maestro_drive::input::calibration::StickCalibration;
    ///
    /// let cal = StickCalibration::new(0.1, 0.0);
    /// assert_eq!(cal.apply(-0.05), 0.0);
    /// assert!((cal.apply(0.55) - 0.5).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn apply(&self, input: f64) -> f64 {
        let input = input.clamp(-1.0, 1.0);
        let sign = input.signum();

        let after_deadzone = self.apply_deadzone(input.abs());
        sign * self.apply_expo(after_deadzone)
    }

    /// Maps values within deadzone to 0, and scales remaining range to 0..1.
    #[inline]
    fn apply_deadzone(&self, abs_input: f64) -> f64 {
        if abs_input <= self.deadzone {
            0.0
        } else {
            (abs_input - self.deadzone) / (1.0 - self.deadzone)
        }
    }

    #[inline]
    fn apply_expo(&self, input: f64) -> f64 {
        if self.expo == 0.0 {
            input
        } else {
            (1.0 - self.expo) * input + self.expo * input * input * input
        }
    }
}

/// Converts a raw axis reading to a normalized value (-1.0 to 1.0).
///
/// The midpoint of `min..=max` maps to 0.0; readings outside the range clamp.
///
/// # Examples
///
/// ```
/// use maestro_drive::input::calibration::normalize_axis;
///
/// assert_eq!(normalize_axis(-32768, -32768, 32767), -1.0);
/// assert_eq!(normalize_axis(32767, -32768, 32767), 1.0);
/// assert!(normalize_axis(128, 0, 255).abs() < 0.01);
/// ```
#[must_use]
pub fn normalize_axis(raw: i32, min: i32, max: i32) -> f64 {
    let min = f64::from(min);
    let max = f64::from(max);
    let center = (min + max) / 2.0;
    let half_range = (max - min) / 2.0;

    if half_range <= 0.0 {
        return 0.0;
    }

    ((f64::from(raw) - center) / half_range).clamp(-1.0, 1.0)
}
