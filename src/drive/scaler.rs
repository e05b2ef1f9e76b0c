//! # Channel Scaler
//!
//! Converts normalized motor power into Maestro target units using a
//! per-channel calibration.
//!
//! ```text
//! power >= 0:  target = center + (max - center) * power
//! power <  0:  target = center + (center - min) * power
//! ```
//!
//! The result is truncated toward zero, so a power of 0 maps exactly to
//! `center` and full deflection maps exactly to `min`/`max`. Target units are
//! quarter-microseconds: the default 4000/6000/8000 is 1000/1500/2000 us.

use super::axis::AxisValue;
use super::mixer::MotorPowers;
use crate::error::{DriveError, Result};
use crate::maestro::protocol::MAESTRO_VALUE_MAX;

/// Default reverse limit in target units.
pub const DEFAULT_MIN: u16 = 4000;
/// Default stopped position in target units.
pub const DEFAULT_CENTER: u16 = 6000;
/// Default forward limit in target units.
pub const DEFAULT_MAX: u16 = 8000;

/// Minimum, center and maximum target of one motor channel.
///
/// Invariant: `min <= center <= max <= 16383`.
///
/// # Examples
///
/// ```
/// use maestro_drive::drive::scaler::ChannelCalibration;
///
/// let cal = ChannelCalibration::new(4000, 6000, 8000)?;
/// assert_eq!(cal.scale(0.0.into()), 6000);
/// assert_eq!(cal.scale(0.5.into()), 7000);
/// assert_eq!(cal.scale((-1.0).into()), 4000);
///
/// assert!(ChannelCalibration::new(6000, 5000, 8000).is_err());
/// # Ok::<(), maestro_drive::error::DriveError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCalibration {
    min: u16,
    center: u16,
    max: u16,
}

impl Default for ChannelCalibration {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN,
            center: DEFAULT_CENTER,
            max: DEFAULT_MAX,
        }
    }
}

impl ChannelCalibration {
    /// Creates a validated calibration.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` unless `min <= center <= max <= 16383`.
    pub fn new(min: u16, center: u16, max: u16) -> Result<Self> {
        if min > center || center > max {
            return Err(DriveError::Configuration(format!(
                "calibration must satisfy min <= center <= max (got {}/{}/{})",
                min, center, max
            )));
        }

        if max > MAESTRO_VALUE_MAX {
            return Err(DriveError::Configuration(format!(
                "calibration max {} exceeds target limit {}",
                max, MAESTRO_VALUE_MAX
            )));
        }

        Ok(Self { min, center, max })
    }

    #[must_use]
    pub fn min(&self) -> u16 {
        self.min
    }

    #[must_use]
    pub fn center(&self) -> u16 {
        self.center
    }

    #[must_use]
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Scales a motor power to target units.
    #[must_use]
    pub fn scale(&self, power: AxisValue) -> u16 {
        let power = power.get();
        let center = f64::from(self.center);

        let target = if power >= 0.0 {
            center + f64::from(self.max - self.center) * power
        } else {
            center + f64::from(self.center - self.min) * power
        };

        // `as` truncates toward zero; target is already within min..=max
        target as u16
    }
}

/// Target pair sent to the driver for one drive call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    /// Left channel target.
    pub left: u16,
    /// Right channel target.
    pub right: u16,
}

/// Scales both motor powers with their channel calibrations.
#[must_use]
pub fn scale_powers(
    powers: MotorPowers,
    left: &ChannelCalibration,
    right: &ChannelCalibration,
) -> MotorCommand {
    MotorCommand {
        left: left.scale(powers.left),
        right: right.scale(powers.right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_cal() -> ChannelCalibration {
        ChannelCalibration::default()
    }

    // ==================== Calibration Tests ====================

    #[test]
    fn test_default_calibration() {
        let cal = default_cal();
        assert_eq!((cal.min(), cal.center(), cal.max()), (4000, 6000, 8000));
    }

    #[test]
    fn test_calibration_rejects_center_below_min() {
        assert!(matches!(
            ChannelCalibration::new(5000, 4000, 8000),
            Err(DriveError::Configuration(_))
        ));
    }

    #[test]
    fn test_calibration_rejects_center_above_max() {
        assert!(ChannelCalibration::new(4000, 9000, 8000).is_err());
    }

    #[test]
    fn test_calibration_rejects_wide_max() {
        assert!(ChannelCalibration::new(4000, 6000, 16384).is_err());
        assert!(ChannelCalibration::new(4000, 6000, 16383).is_ok());
    }

    #[test]
    fn test_calibration_allows_degenerate_triple() {
        let cal = ChannelCalibration::new(6000, 6000, 6000).unwrap();
        assert_eq!(cal.scale(AxisValue::MAX), 6000);
        assert_eq!(cal.scale(AxisValue::MIN), 6000);
    }

    // ==================== Scaling Tests ====================

    #[test]
    fn test_scale_zero_is_center() {
        assert_eq!(default_cal().scale(AxisValue::ZERO), 6000);
    }

    #[test]
    fn test_scale_endpoints() {
        let cal = default_cal();
        assert_eq!(cal.scale(AxisValue::MAX), 8000);
        assert_eq!(cal.scale(AxisValue::MIN), 4000);
    }

    #[test]
    fn test_scale_asymmetric_calibration() {
        let cal = ChannelCalibration::new(5000, 6000, 8000).unwrap();
        assert_eq!(cal.scale(AxisValue::new(0.5)), 7000);
        assert_eq!(cal.scale(AxisValue::new(-0.5)), 5500);
        assert_eq!(cal.scale(AxisValue::MIN), 5000);
    }

    #[test]
    fn test_scale_truncates_toward_zero() {
        let cal = ChannelCalibration::new(4000, 6000, 8001).unwrap();
        // 6000 + 2001 * 0.5 = 7000.5
        assert_eq!(cal.scale(AxisValue::new(0.5)), 7000);

        let cal = ChannelCalibration::new(3999, 6000, 8000).unwrap();
        // 6000 - 2001 * 0.5 = 4999.5
        assert_eq!(cal.scale(AxisValue::new(-0.5)), 4999);
    }

    #[test]
    fn test_scale_is_monotonic() {
        let cals = [
            default_cal(),
            ChannelCalibration::new(4500, 6100, 7300).unwrap(),
            ChannelCalibration::new(0, 0, 16383).unwrap(),
        ];

        for cal in cals {
            let mut previous = cal.scale(AxisValue::MIN);
            for i in -1000..=1000 {
                let target = cal.scale(AxisValue::new(f64::from(i) / 1000.0));
                assert!(target >= previous, "not monotonic at {}", i);
                assert!((cal.min()..=cal.max()).contains(&target));
                previous = target;
            }
        }
    }

    #[test]
    fn test_scale_powers_pair() {
        let cal = default_cal();
        assert_eq!(
            scale_powers(MotorPowers::STOPPED, &cal, &cal),
            MotorCommand { left: 6000, right: 6000 }
        );
        assert_eq!(
            scale_powers(MotorPowers::new(1.0, 1.0), &cal, &cal),
            MotorCommand { left: 8000, right: 8000 }
        );
        assert_eq!(
            scale_powers(MotorPowers::new(-1.0, -1.0), &cal, &cal),
            MotorCommand { left: 4000, right: 4000 }
        );
    }

    #[test]
    fn test_scale_powers_uses_each_side_calibration() {
        let left = ChannelCalibration::new(4000, 6000, 8000).unwrap();
        let right = ChannelCalibration::new(4200, 6100, 7900).unwrap();
        let cmd = scale_powers(MotorPowers::STOPPED, &left, &right);
        assert_eq!(cmd, MotorCommand { left: 6000, right: 6100 });
    }
}
