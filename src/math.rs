//! Angle helpers and nalgebra extensions shared by the orientation engine

use core::f32::consts::{PI, TAU};
use nalgebra::{UnitQuaternion, Vector3};

/// Mathematical constants
pub const DEG_TO_RAD: f32 = PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / PI;

/// Threshold on the rotation matrix element m23 beyond which the Y-X-Z
/// decomposition is treated as gimbal locked.
const GIMBAL_LOCK_THRESHOLD: f32 = 0.9999999;

/// Wrap an angle into the half-open interval (-π, π]
///
/// # Example
/// ```
/// use ar_compass::wrap_pi;
/// use core::f32::consts::PI;
///
/// assert!((wrap_pi(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-6);
/// assert_eq!(wrap_pi(-PI), PI);
/// ```
pub fn wrap_pi(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Wrap an angle into [0, 2π)
pub fn wrap_two_pi(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Extension trait for horizontal-plane operations on render-frame vectors
pub trait Vector3Ext {
    /// Drop the vertical (y) component
    fn horizontal(&self) -> Vector3<f32>;
}

impl Vector3Ext for Vector3<f32> {
    fn horizontal(&self) -> Vector3<f32> {
        Vector3::new(self.x, 0.0, self.z)
    }
}

/// Extension trait for Euler conversions in the render camera's Y-X-Z order
///
/// Angles are returned and accepted as `(x, y, z)` = (pitch, yaw, roll) in
/// radians, with the rotation applied as `Ry(y) * Rx(x) * Rz(z)`.
pub trait QuaternionExt {
    /// Decompose into Y-X-Z Euler angles `(x, y, z)`
    fn to_yxz_euler(&self) -> Vector3<f32>;

    /// Compose a quaternion from Y-X-Z Euler angles
    fn from_yxz_euler(x: f32, y: f32, z: f32) -> UnitQuaternion<f32>;

    /// Yaw about the vertical axis in the Y-X-Z decomposition
    fn yaw(&self) -> f32 {
        self.to_yxz_euler().y
    }
}

impl QuaternionExt for UnitQuaternion<f32> {
    fn to_yxz_euler(&self) -> Vector3<f32> {
        let rotation = self.to_rotation_matrix();
        let m = rotation.matrix();

        let m23 = m[(1, 2)];
        let x = (-m23.clamp(-1.0, 1.0)).asin();

        if m23.abs() < GIMBAL_LOCK_THRESHOLD {
            let y = m[(0, 2)].atan2(m[(2, 2)]);
            let z = m[(1, 0)].atan2(m[(1, 1)]);
            Vector3::new(x, y, z)
        } else {
            let y = (-m[(2, 0)]).atan2(m[(0, 0)]);
            Vector3::new(x, y, 0.0)
        }
    }

    fn from_yxz_euler(x: f32, y: f32, z: f32) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), y)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), x)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z)
    }
}
