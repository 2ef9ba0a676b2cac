//! Reconciliation between sensor-integrated yaw and the live compass heading

use crate::math::{wrap_pi, wrap_two_pi};
use crate::quaternion::{extract_yaw, sample_quaternion};
use crate::types::{OrientationSample, ScreenOrientation};
use core::f32::consts::TAU;
use nalgebra::{Rotation3, Vector3};

/// Convert a clockwise compass heading into a render-frame yaw
///
/// # Arguments
/// * `compass_heading` - Clockwise heading from north in radians
///
/// # Returns
/// Counter-clockwise yaw in [0, 2π)
///
/// # Example
/// ```
/// use ar_compass::compass::compass_yaw;
/// use core::f32::consts::{FRAC_PI_2, PI};
///
/// let yaw = compass_yaw(FRAC_PI_2);
/// assert!((yaw - 3.0 * PI / 2.0).abs() < 1e-6);
/// ```
pub fn compass_yaw(compass_heading: f32) -> f32 {
    wrap_two_pi(TAU - compass_heading)
}

/// Yaw correction from the sensor frame to compass north, in (-π, π]
pub fn yaw_correction(sensor_yaw: f32, compass_heading: f32) -> f32 {
    wrap_pi(compass_yaw(compass_heading) - sensor_yaw)
}

/// Rotate a point about the vertical axis through `pivot`
///
/// The vertical offset between point and pivot is preserved.
pub fn rotate_about_pivot(point: Vector3<f32>, pivot: Vector3<f32>, angle: f32) -> Vector3<f32> {
    let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), angle);
    pivot + rotation * (point - pivot)
}

/// Computes the yaw correction applied to world-anchored markers
///
/// The camera keeps the sensor quaternion, which drifts away from the live
/// compass. Markers placed in world space are rotated about the camera by
/// the difference so they stay on their compass bearing. The correction is
/// only produced when the sample carries an absolute heading and the screen
/// is in landscape; every other combination leaves markers where they were
/// projected.
///
/// # Example
/// ```
/// use ar_compass::{CompassReconciler, OrientationSample, ScreenOrientation};
///
/// let sample = OrientationSample {
///     alpha: 0.0,
///     beta: core::f32::consts::FRAC_PI_2,
///     gamma: 0.0,
///     absolute_heading: Some(0.3),
/// };
///
/// // Portrait never corrects
/// let correction = CompassReconciler.correction(&sample, &ScreenOrientation::PORTRAIT);
/// assert!(correction.is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CompassReconciler;

impl CompassReconciler {
    /// Yaw correction for the current sample, if the gate passes
    pub fn correction(&self, sample: &OrientationSample, screen: &ScreenOrientation) -> Option<f32> {
        let heading = sample.absolute_heading?;
        if !screen.is_landscape() {
            return None;
        }

        let sensor_yaw = extract_yaw(&sample_quaternion(sample, screen));
        Some(yaw_correction(sensor_yaw, heading))
    }

    /// Position of a marker after applying `correction` about the camera
    pub fn apply(&self, marker: Vector3<f32>, camera_position: Vector3<f32>, correction: f32) -> Vector3<f32> {
        rotate_about_pivot(marker, camera_position, correction)
    }
}
