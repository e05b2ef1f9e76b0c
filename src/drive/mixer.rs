//! # Arcade Drive Mixer
//!
//! Mixes a steering axis and a throttle axis into left/right motor powers.
//!
//! ```text
//! v = (1 - |steer|) * throttle + throttle
//! w = (1 - |throttle|) * steer + steer
//! left  = (v - w) / 2
//! right = -(v + w) / 2
//! ```
//!
//! `v` scales throttle by steering magnitude and `w` scales steering by
//! throttle magnitude, which keeps full turning authority at low throttle.
//!
//! The right power is in the right channel's own sense. The right motor is
//! mounted mirrored, so driving both wheels forward commands the right
//! channel negative. [`MotorPowers::wheel_speeds`] gives the wheel-frame view.
//!
//! ## Usage
//!
//! ```
//! use maestro_drive::drive::axis::AxisValue;
//! use maestro_drive::drive::mixer::arcade_mix;
//!
//! // Full throttle, no steering: both wheels forward
//! let powers = arcade_mix(AxisValue::ZERO, AxisValue::MAX);
//! assert_eq!(powers.wheel_speeds(), (1.0, 1.0));
//! assert_eq!((powers.left.get(), powers.right.get()), (1.0, -1.0));
//! ```

use super::axis::AxisValue;

/// Normalized motor powers in channel terms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorPowers {
    /// Left channel power.
    pub left: AxisValue,
    /// Right channel power (mirrored mounting).
    pub right: AxisValue,
}

impl MotorPowers {
    /// Both motors stopped.
    pub const STOPPED: Self = Self {
        left: AxisValue::ZERO,
        right: AxisValue::ZERO,
    };

    /// Creates motor powers, clamping each side to -1.0..=1.0.
    #[must_use]
    pub fn new(left: f64, right: f64) -> Self {
        Self {
            left: AxisValue::new(left),
            right: AxisValue::new(right),
        }
    }

    /// Left and right wheel speeds, forward positive.
    #[must_use]
    pub fn wheel_speeds(&self) -> (f64, f64) {
        (self.left.get(), -self.right.get())
    }
}

/// Mixes steering and throttle into motor powers.
///
/// Pure computation. The formula keeps in-range inputs within -1.0..=1.0;
/// the result is still clamped so float rounding can never leak past the
/// boundary.
#[must_use]
pub fn arcade_mix(steer: AxisValue, throttle: AxisValue) -> MotorPowers {
    let steer = steer.get();
    let throttle = throttle.get();

    let v = (1.0 - steer.abs()) * throttle + throttle;
    let w = (1.0 - throttle.abs()) * steer + steer;

    MotorPowers::new((v - w) / 2.0, -(v + w) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    /// -1.0 to 1.0 in steps of 0.05
    fn grid() -> impl Iterator<Item = f64> + Clone {
        (-20..=20).map(|i| f64::from(i) * 0.05)
    }

    fn mix(steer: f64, throttle: f64) -> (f64, f64) {
        let powers = arcade_mix(AxisValue::new(steer), AxisValue::new(throttle));
        (powers.left.get(), powers.right.get())
    }

    // ==================== Reference Points ====================

    #[test]
    fn test_centered_sticks_stop() {
        assert_eq!(mix(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_full_throttle() {
        assert_eq!(mix(0.0, 1.0), (1.0, -1.0));
        assert_eq!(mix(0.0, -1.0), (-1.0, 1.0));
    }

    #[test]
    fn test_full_right_turn_in_place() {
        // v = 0, w = 2
        assert_eq!(mix(1.0, 0.0), (-1.0, -1.0));
    }

    #[test]
    fn test_full_left_turn_in_place() {
        assert_eq!(mix(-1.0, 0.0), (1.0, 1.0));
    }

    #[test]
    fn test_full_throttle_full_steer() {
        // v = 1, w = 1
        assert_eq!(mix(1.0, 1.0), (0.0, -1.0));
        assert_eq!(mix(-1.0, 1.0), (1.0, 0.0));
    }

    #[test]
    fn test_half_steer_full_throttle() {
        // v = 1.5, w = 0.5
        assert_eq!(mix(0.5, 1.0), (0.5, -1.0));
    }

    // ==================== Properties ====================

    #[test]
    fn test_no_steer_drives_straight() {
        for throttle in grid() {
            let powers = arcade_mix(AxisValue::ZERO, AxisValue::new(throttle));
            let (left, right) = powers.wheel_speeds();
            assert!((left - throttle).abs() < EPSILON, "throttle {}", throttle);
            assert!((right - throttle).abs() < EPSILON, "throttle {}", throttle);
        }
    }

    #[test]
    fn test_no_throttle_rotates_in_place() {
        for steer in grid() {
            let powers = arcade_mix(AxisValue::new(steer), AxisValue::ZERO);
            let (left, right) = powers.wheel_speeds();
            assert!((left + right).abs() < EPSILON, "steer {}", steer);
            assert!((left.abs() - steer.abs()).abs() < EPSILON, "steer {}", steer);
        }
    }

    #[test]
    fn test_outputs_bounded_on_grid() {
        for steer in grid() {
            for throttle in grid() {
                let (left, right) = mix(steer, throttle);
                let at = (steer, throttle);
                assert!((-1.0..=1.0).contains(&left), "left {} at {:?}", left, at);
                assert!((-1.0..=1.0).contains(&right), "right {} at {:?}", right, at);
            }
        }
    }

    #[test]
    fn test_steer_mirrors_left_and_right() {
        for steer in grid() {
            for throttle in grid() {
                let a = arcade_mix(AxisValue::new(steer), AxisValue::new(throttle)).wheel_speeds();
                let b = arcade_mix(AxisValue::new(-steer), AxisValue::new(throttle)).wheel_speeds();
                assert!((a.0 - b.1).abs() < EPSILON);
                assert!((a.1 - b.0).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_motor_powers_clamp() {
        let powers = MotorPowers::new(1.5, -2.0);
        assert_eq!(powers.left, AxisValue::MAX);
        assert_eq!(powers.right, AxisValue::MIN);
    }

    #[test]
    fn test_stopped_constant() {
        assert_eq!(MotorPowers::STOPPED, MotorPowers::default());
        assert_eq!(MotorPowers::STOPPED.wheel_speeds(), (0.0, -0.0));
    }
}
