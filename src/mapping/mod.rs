//! # Calibration & Mapping Module
//!
//! Converts angle deviation from a calibrated neutral pose into virtual
//! analog-stick axis values.
//!
//! ## Mapping
//!
//! Each axis is driven by one angle: `delta = current - center` is normalized
//! by the full-deflection limit, clamped to `[-1, 1]`, and scaled to the
//! signed 16-bit stick range. A delta at or beyond the limit saturates the
//! axis; between the limits the response is linear.
//!
//! ## Mapping Modes
//!
//! Two historical conventions exist for which angles drive the stick and how
//! the neutral pose is established. Both are supported and selected in the
//! configuration:
//!
//! | Mode | Stick X | Stick Y | Baseline capture |
//! |----------------|----------------|--------|--------------------------------|
//! | `heading-pitch` | −heading delta | pitch delta | automatic, first valid sample |
//! | `roll-pitch` | roll delta | pitch delta | manual trigger, re-triggerable |
//!
//! The heading axis is sign-inverted in heading-pitch mode so that turning the
//! foot clockwise pushes the stick left, matching the original convention.

use serde::Deserialize;

use crate::telemetry::OrientationSample;

/// Maximum stick deflection magnitude.
pub const AXIS_MAX: i16 = 32767;

/// The pair of mapped stick values forwarded to the virtual gamepad.
///
/// Derived each cycle from the live sample and the baseline; never stored
/// beyond the cycle that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappedAxes {
    /// Stick X, clamped to `-32767..=32767`.
    pub x: i16,
    /// Stick Y, clamped to `-32767..=32767`.
    pub y: i16,
}

/// Maps an angle's deviation from center to a stick axis value.
///
/// # Arguments
///
/// * `current` - Live angle in degrees
/// * `center` - Calibrated neutral angle in degrees
/// * `limit` - Degrees of deviation producing full deflection; must be
///   strictly positive (enforced by config validation, not here)
///
/// # Returns
///
/// `round(clamp((current - center) / limit, -1, 1) * 32767)` as `i16`.
/// Pure and total for finite inputs, monotonic in the delta within
/// `[-limit, limit]`, saturated outside it.
///
/// # Examples
///
/// ```
/// use tiltstick::mapping::map_angle_to_axis;
///
/// assert_eq!(map_angle_to_axis(10.0, 10.0, 45.0), 0);
/// assert_eq!(map_angle_to_axis(55.0, 10.0, 45.0), 32767);  // delta == limit
/// assert_eq!(map_angle_to_axis(-80.0, 10.0, 45.0), -32767); // beyond -limit
/// ```
#[must_use]
pub fn map_angle_to_axis(current: f64, center: f64, limit: f64) -> i16 {
    let delta = current - center;
    let normalized = (delta / limit).clamp(-1.0, 1.0);
    (normalized * AXIS_MAX as f64).round() as i16
}

/// Which angles drive the stick and how the baseline is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingMode {
    /// X from heading (inverted), Y from pitch. Baseline is captured
    /// automatically from the first valid sample of the session.
    HeadingPitch,
    /// X from roll, Y from pitch. Baseline is captured only on an explicit
    /// operator trigger and may be re-captured at any time.
    RollPitch,
}

impl MappingMode {
    /// Whether this mode captures its baseline from the first valid sample
    /// without an operator trigger.
    #[must_use]
    pub fn auto_baseline(&self) -> bool {
        matches!(self, MappingMode::HeadingPitch)
    }

    /// Captures the subset of sample fields this mode uses as neutral.
    #[must_use]
    pub fn capture_baseline(&self, sample: &OrientationSample) -> Baseline {
        match self {
            MappingMode::HeadingPitch => Baseline::HeadingPitch {
                heading: sample.heading,
                pitch: sample.pitch,
            },
            MappingMode::RollPitch => Baseline::RollPitch {
                roll: sample.roll,
                pitch: sample.pitch,
            },
        }
    }
}

/// The calibrated neutral pose.
///
/// Holds only the angles the active [`MappingMode`] maps; set explicitly (or
/// automatically in heading-pitch mode) and never recomputed from drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Baseline {
    /// Neutral heading and pitch (heading-pitch mode).
    HeadingPitch { heading: f64, pitch: f64 },
    /// Neutral roll and pitch (roll-pitch mode).
    RollPitch { roll: f64, pitch: f64 },
}

impl Baseline {
    /// Maps a live sample against this baseline.
    ///
    /// # Arguments
    ///
    /// * `sample` - Latest orientation sample
    /// * `limit` - Full-deflection limit in degrees
    ///
    /// # Examples
    ///
    /// ```
    /// use tiltstick::mapping::{Baseline, MappedAxes};
    /// use tiltstick::telemetry::OrientationSample;
    ///
    /// let baseline = Baseline::RollPitch { roll: 0.0, pitch: 0.0 };
    /// let level = OrientationSample { heading: 90.0, pitch: 0.0, roll: 0.0 };
    /// assert_eq!(baseline.map(&level, 45.0), MappedAxes { x: 0, y: 0 });
    /// ```
    #[must_use]
    pub fn map(&self, sample: &OrientationSample, limit: f64) -> MappedAxes {
        match *self {
            Baseline::HeadingPitch { heading, pitch } => MappedAxes {
                // map_angle_to_axis never returns i16::MIN, so negation cannot overflow
                x: map_angle_to_axis(sample.heading, heading, limit).saturating_neg(),
                y: map_angle_to_axis(sample.pitch, pitch, limit),
            },
            Baseline::RollPitch { roll, pitch } => MappedAxes {
                x: map_angle_to_axis(sample.roll, roll, limit),
                y: map_angle_to_axis(sample.pitch, pitch, limit),
            },
        }
    }

    /// Human-readable description of the captured neutral pose.
    #[must_use]
    pub fn describe(&self) -> String {
        match *self {
            Baseline::HeadingPitch { heading, pitch } => {
                format!("heading={:.2}°, pitch={:.2}°", heading, pitch)
            }
            Baseline::RollPitch { roll, pitch } => {
                format!("roll={:.2}°, pitch={:.2}°", roll, pitch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: f64 = 45.0;

    fn sample(heading: f64, pitch: f64, roll: f64) -> OrientationSample {
        OrientationSample {
            heading,
            pitch,
            roll,
        }
    }

    #[test]
    fn test_zero_at_center() {
        for center in [-180.0, -37.5, 0.0, 10.0, 359.9] {
            assert_eq!(
                map_angle_to_axis(center, center, LIMIT),
                0,
                "Center {} should map to 0",
                center
            );
        }
    }

    #[test]
    fn test_saturates_at_limit() {
        // delta == limit saturates exactly
        assert_eq!(map_angle_to_axis(55.0, 10.0, LIMIT), 32767);
        assert_eq!(map_angle_to_axis(-35.0, 10.0, LIMIT), -32767);
    }

    #[test]
    fn test_saturates_beyond_limit() {
        assert_eq!(map_angle_to_axis(200.0, 0.0, LIMIT), 32767);
        assert_eq!(map_angle_to_axis(-200.0, 0.0, LIMIT), -32767);
    }

    #[test]
    fn test_half_deflection() {
        // 22.5° of 45° is half deflection: 16383 or 16384 depending on rounding
        let value = map_angle_to_axis(22.5, 0.0, LIMIT);
        assert!(
            (value as i32 - 16383).abs() <= 1,
            "Half deflection should be 16383±1, got {}",
            value
        );
    }

    #[test]
    fn test_output_always_within_stick_range() {
        for delta in (-900..=900).map(|d| d as f64 / 2.0) {
            let value = map_angle_to_axis(delta, 0.0, LIMIT);
            assert!(
                (-AXIS_MAX..=AXIS_MAX).contains(&value),
                "Output {} out of range for delta {}",
                value,
                delta
            );
        }
    }

    #[test]
    fn test_monotonic_within_limits() {
        let mut previous = map_angle_to_axis(-LIMIT, 0.0, LIMIT);
        for step in 1..=180 {
            let delta = -LIMIT + (step as f64) * 0.5;
            let value = map_angle_to_axis(delta, 0.0, LIMIT);
            assert!(
                value >= previous,
                "Not monotonic at delta {}: {} < {}",
                delta,
                value,
                previous
            );
            previous = value;
        }
    }

    #[test]
    fn test_linear_within_limits() {
        // Within ±limit the response is linear up to rounding
        for delta in [-40.0, -11.25, 4.5, 30.0] {
            let expected = (delta / LIMIT * 32767.0).round() as i16;
            assert_eq!(map_angle_to_axis(delta, 0.0, LIMIT), expected);
        }
    }

    #[test]
    fn test_heading_pitch_mode_inverts_x() {
        let baseline = MappingMode::HeadingPitch.capture_baseline(&sample(10.0, 0.0, 0.0));
        let axes = baseline.map(&sample(55.0, 0.0, 0.0), LIMIT);
        assert_eq!(axes.x, -32767, "Heading right should deflect stick left");
        assert_eq!(axes.y, 0);
    }

    #[test]
    fn test_heading_pitch_mode_maps_pitch_to_y() {
        let baseline = MappingMode::HeadingPitch.capture_baseline(&sample(0.0, 0.0, 0.0));
        let axes = baseline.map(&sample(0.0, 22.5, 0.0), LIMIT);
        assert_eq!(axes.x, 0);
        assert!((axes.y as i32 - 16383).abs() <= 1);
    }

    #[test]
    fn test_heading_pitch_mode_ignores_roll() {
        let baseline = MappingMode::HeadingPitch.capture_baseline(&sample(0.0, 0.0, 0.0));
        let axes = baseline.map(&sample(0.0, 0.0, 90.0), LIMIT);
        assert_eq!(axes, MappedAxes { x: 0, y: 0 });
    }

    #[test]
    fn test_roll_pitch_mode_maps_roll_to_x_uninverted() {
        let baseline = MappingMode::RollPitch.capture_baseline(&sample(0.0, 0.0, 5.0));
        let axes = baseline.map(&sample(0.0, 0.0, 50.0), LIMIT);
        assert_eq!(axes.x, 32767, "Roll right should deflect stick right");
        assert_eq!(axes.y, 0);
    }

    #[test]
    fn test_roll_pitch_mode_ignores_heading() {
        let baseline = MappingMode::RollPitch.capture_baseline(&sample(0.0, 0.0, 0.0));
        let axes = baseline.map(&sample(170.0, 0.0, 0.0), LIMIT);
        assert_eq!(axes, MappedAxes { x: 0, y: 0 });
    }

    #[test]
    fn test_capture_baseline_takes_mode_subset() {
        let s = sample(10.0, -3.0, 2.0);

        assert_eq!(
            MappingMode::HeadingPitch.capture_baseline(&s),
            Baseline::HeadingPitch {
                heading: 10.0,
                pitch: -3.0
            }
        );
        assert_eq!(
            MappingMode::RollPitch.capture_baseline(&s),
            Baseline::RollPitch {
                roll: 2.0,
                pitch: -3.0
            }
        );
    }

    #[test]
    fn test_auto_baseline_flags() {
        assert!(MappingMode::HeadingPitch.auto_baseline());
        assert!(!MappingMode::RollPitch.auto_baseline());
    }

    #[test]
    fn test_mode_deserializes_from_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: MappingMode,
        }

        let wrapper: Wrapper = toml::from_str(r#"mode = "heading-pitch""#).unwrap();
        assert_eq!(wrapper.mode, MappingMode::HeadingPitch);

        let wrapper: Wrapper = toml::from_str(r#"mode = "roll-pitch""#).unwrap();
        assert_eq!(wrapper.mode, MappingMode::RollPitch);

        let result: std::result::Result<Wrapper, _> = toml::from_str(r#"mode = "yaw-pitch""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_axes_are_neutral() {
        assert_eq!(MappedAxes::default(), MappedAxes { x: 0, y: 0 });
    }
}
