//! Projection of geographic points into the local rendering frame

use crate::distance::EARTH_RADIUS_M;
use crate::error::ProjectionError;
use crate::types::GeoPoint;

/// Maps longitude/latitude onto the horizontal plane of the rendering frame
///
/// Implementations must fail with [`ProjectionError::NoReferencePosition`]
/// until the user's first geolocation fix is known.
pub trait WorldProjector {
    /// Project a point to `(x, z)` in the rendering frame
    fn project_to_world(&self, point: &GeoPoint) -> Result<(f32, f32), ProjectionError>;
}

impl<P: WorldProjector + ?Sized> WorldProjector for &P {
    fn project_to_world(&self, point: &GeoPoint) -> Result<(f32, f32), ProjectionError> {
        (**self).project_to_world(point)
    }
}

/// Equirectangular tangent-plane projection about a reference point
///
/// East maps to +x and north to -z, so a target straight ahead of a camera
/// facing north lies on the -z axis.
///
/// # Example
/// ```
/// use ar_compass::{GeoPoint, LocalTangentPlane, ProjectionError, WorldProjector};
///
/// let mut plane = LocalTangentPlane::new();
/// let target = GeoPoint::new(7.651058, 51.935260);
/// assert_eq!(plane.project_to_world(&target), Err(ProjectionError::NoReferencePosition));
///
/// plane.set_reference(GeoPoint::new(7.651110, 51.933416));
/// let (_, z) = plane.project_to_world(&target).unwrap();
/// assert!(z < 0.0); // target is to the north
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTangentPlane {
    reference: Option<GeoPoint>,
}

impl LocalTangentPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor the plane at a geolocation fix
    pub fn set_reference(&mut self, reference: GeoPoint) {
        if self.reference.is_none() {
            tracing::debug!(
                longitude = reference.longitude,
                latitude = reference.latitude,
                "Projection reference set"
            );
        }
        self.reference = Some(reference);
    }

    pub fn reference(&self) -> Option<GeoPoint> {
        self.reference
    }
}

impl WorldProjector for LocalTangentPlane {
    fn project_to_world(&self, point: &GeoPoint) -> Result<(f32, f32), ProjectionError> {
        let reference = self.reference.ok_or(ProjectionError::NoReferencePosition)?;

        let mean_latitude = ((point.latitude + reference.latitude) / 2.0).to_radians();
        let east = (point.longitude - reference.longitude).to_radians() * mean_latitude.cos() * EARTH_RADIUS_M;
        let north = (point.latitude - reference.latitude).to_radians() * EARTH_RADIUS_M;

        Ok((east as f32, -north as f32))
    }
}
