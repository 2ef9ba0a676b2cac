//! Relative on-screen bearing from the user towards a target

use crate::error::ProjectionError;
use crate::math::{Vector3Ext, wrap_pi};
use crate::projection::WorldProjector;
use crate::types::GeoPoint;
use core::f32::consts::PI;
use nalgebra::Vector3;

/// Rotation of the navigation arrow towards a target
///
/// The horizontal direction from user to target is measured with
/// `atan2(x, z)`, the screen rotation is taken out of the heading so turning
/// the chassis without turning the screen content does not move the arrow,
/// and a half turn is added because the arrow model points away from the
/// camera at rest.
///
/// # Arguments
/// * `user` - User position in the rendering frame
/// * `target` - Target position in the rendering frame
/// * `heading` - User heading in radians
/// * `screen_angle` - Screen rotation in radians
///
/// # Returns
/// Arrow yaw in radians, in (-π, π]
///
/// # Example
/// ```
/// use ar_compass::compute_bearing;
/// use nalgebra::Vector3;
///
/// let user = Vector3::new(0.0, 1.5, 0.0);
/// let target = Vector3::new(10.0, 1.5, 0.0);
/// let angle = compute_bearing(&user, &target, 0.0, 0.0);
/// assert!((angle + core::f32::consts::FRAC_PI_2).abs() < 1e-6);
/// ```
pub fn compute_bearing(user: &Vector3<f32>, target: &Vector3<f32>, heading: f32, screen_angle: f32) -> f32 {
    let direction = (target - user).horizontal();
    let target_angle = direction.x.atan2(direction.z);

    let compensated_heading = heading - screen_angle;
    wrap_pi(target_angle - compensated_heading + PI)
}

/// [`compute_bearing`] for geographic points
///
/// Both points are projected at the same elevation, so only their horizontal
/// separation matters.
pub fn compute_relative_bearing<P: WorldProjector>(
    target: &GeoPoint,
    user: &GeoPoint,
    heading: f32,
    screen_angle: f32,
    projector: &P,
) -> Result<f32, ProjectionError> {
    let (target_x, target_z) = projector.project_to_world(target)?;
    let (user_x, user_z) = projector.project_to_world(user)?;

    Ok(compute_bearing(
        &Vector3::new(user_x, 0.0, user_z),
        &Vector3::new(target_x, 0.0, target_z),
        heading,
        screen_angle,
    ))
}
