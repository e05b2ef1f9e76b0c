//! # Normalized Axis Values
//!
//! [`AxisValue`] carries a control input or motor power that is guaranteed to
//! lie in -1.0 to 1.0. Out-of-range values are clamped at construction rather
//! than rejected, so a misbehaving input never stalls the control loop.

use tracing::{debug, warn};

/// A real number in the range -1.0 to 1.0.
///
/// # Examples
///
/// ```
/// use maestro_drive::drive::axis::AxisValue;
///
/// assert_eq!(AxisValue::new(0.5).get(), 0.5);
/// assert_eq!(AxisValue::new(1.7).get(), 1.0);
/// assert_eq!(AxisValue::new(f64::NAN).get(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct AxisValue(f64);

impl AxisValue {
    /// Center / stopped.
    pub const ZERO: Self = Self(0.0);
    /// Full negative deflection.
    pub const MIN: Self = Self(-1.0);
    /// Full positive deflection.
    pub const MAX: Self = Self(1.0);

    /// Creates an axis value, clamping to -1.0..=1.0.
    ///
    /// NaN is treated as 0.0 (stopped).
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            warn!("NaN axis value replaced with 0.0");
            return Self::ZERO;
        }

        if !(-1.0..=1.0).contains(&value) {
            debug!("Axis value {} clamped to [-1, 1]", value);
        }

        Self(value.clamp(-1.0, 1.0))
    }

    /// Creates an axis value only if it is already in range.
    ///
    /// ```
    /// use maestro_drive::drive::axis::AxisValue;
    ///
    /// assert!(AxisValue::try_new(-1.0).is_some());
    /// assert!(AxisValue::try_new(1.01).is_none());
    /// ```
    #[must_use]
    pub fn try_new(value: f64) -> Option<Self> {
        (-1.0..=1.0).contains(&value).then_some(Self(value))
    }

    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for AxisValue {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<AxisValue> for f64 {
    fn from(value: AxisValue) -> Self {
        value.0
    }
}

impl std::ops::Neg for AxisValue {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}
