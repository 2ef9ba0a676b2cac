//! Device-orientation quaternion for the virtual camera

use crate::math::QuaternionExt;
use crate::types::{OrientationSample, ScreenOrientation};
use core::f32::consts::FRAC_1_SQRT_2;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Fixed -90° rotation about X turning the device's screen-facing +Z into
/// the camera's viewing -Z
pub fn screen_facing_correction() -> UnitQuaternion<f32> {
    UnitQuaternion::new_unchecked(Quaternion::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0, 0.0))
}

/// Build the camera rotation for a device orientation
///
/// The device reports Z-X-Y intrinsic angles while the camera composes Y-X-Z,
/// so the Euler triple is applied as `(beta, alpha, -gamma)` in Y-X-Z order,
/// then corrected for the screen-facing axis and for the screen rotation.
///
/// # Arguments
/// * `alpha` - Yaw in radians
/// * `beta` - Front-to-back tilt in radians
/// * `gamma` - Left-to-right tilt in radians
/// * `screen_angle` - Screen rotation in radians
///
/// # Example
/// ```
/// use ar_compass::build_quaternion;
/// use core::f32::consts::FRAC_1_SQRT_2;
///
/// let q = build_quaternion(0.0, 0.0, 0.0, 0.0);
/// assert_eq!(q.w, FRAC_1_SQRT_2);
/// assert_eq!(q.i, -FRAC_1_SQRT_2);
/// ```
pub fn build_quaternion(alpha: f32, beta: f32, gamma: f32, screen_angle: f32) -> UnitQuaternion<f32> {
    let device = UnitQuaternion::from_yxz_euler(beta, alpha, -gamma);
    let screen = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -screen_angle);

    device * screen_facing_correction() * screen
}

/// [`build_quaternion`] for a canonical sample and screen state
pub fn sample_quaternion(sample: &OrientationSample, screen: &ScreenOrientation) -> UnitQuaternion<f32> {
    build_quaternion(sample.alpha, sample.beta, sample.gamma, screen.angle_radians())
}

/// Yaw of the camera rotation built from the given angles
pub fn extract_yaw(quaternion: &UnitQuaternion<f32>) -> f32 {
    quaternion.yaw()
}

/// Replace the yaw of a camera rotation, keeping its pitch and roll
pub fn with_yaw(quaternion: &UnitQuaternion<f32>, yaw: f32) -> UnitQuaternion<f32> {
    let euler = quaternion.to_yxz_euler();
    UnitQuaternion::from_yxz_euler(euler.x, yaw, euler.z)
}
