//! Per-frame overlay drivers: the navigation arrow and the world-anchored
//! target marker

use crate::bearing::compute_relative_bearing;
use crate::compass::CompassReconciler;
use crate::error::ProjectionError;
use crate::projection::WorldProjector;
use crate::session::OrientationSession;
use crate::types::{Camera, GeoPoint};
use nalgebra::Vector3;

/// Arrow pointing from the user towards a geographic target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationArrow {
    pub target: GeoPoint,
}

impl NavigationArrow {
    pub fn new(target: GeoPoint) -> Self {
        Self { target }
    }

    /// Arrow yaw in radians for this frame
    ///
    /// Returns `None`, leaving the arrow where it was, until the user's
    /// position is known and the projector has a reference.
    pub fn update<P: WorldProjector>(
        &self,
        projector: &P,
        session: &OrientationSession,
        user: Option<GeoPoint>,
    ) -> Option<f32> {
        let user = user?;
        let heading = session.heading_radians();
        let screen_angle = session.screen_orientation().angle_radians();

        match compute_relative_bearing(&self.target, &user, heading, screen_angle, projector) {
            Ok(angle) => Some(angle),
            Err(ProjectionError::NoReferencePosition) => {
                tracing::trace!("Arrow skipped, no reference position yet");
                None
            }
        }
    }
}

/// What a marker update did this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerUpdate {
    /// Projection unavailable; the marker keeps its previous position
    Skipped,
    /// Placed at the uncorrected projected position
    Projected(Vector3<f32>),
    /// Placed at the projected position rotated onto the compass bearing
    Corrected(Vector3<f32>),
}

impl MarkerUpdate {
    /// New marker position, if the frame moved it
    pub fn position(&self) -> Option<Vector3<f32>> {
        match self {
            Self::Skipped => None,
            Self::Projected(position) | Self::Corrected(position) => Some(*position),
        }
    }
}

/// Marker anchored at a geographic target in the rendering frame
///
/// The projected position is kept separately from the displayed one, so a
/// correction never accumulates across frames and is dropped as soon as the
/// compass gate closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetMarker {
    pub target: GeoPoint,
    position: Option<Vector3<f32>>,
}

impl TargetMarker {
    pub fn new(target: GeoPoint) -> Self {
        Self { target, position: None }
    }

    /// Last displayed position
    pub fn position(&self) -> Option<Vector3<f32>> {
        self.position
    }

    pub fn update<P: WorldProjector>(
        &mut self,
        projector: &P,
        session: &OrientationSession,
        camera: &Camera,
    ) -> MarkerUpdate {
        let (x, z) = match projector.project_to_world(&self.target) {
            Ok(projected) => projected,
            Err(error) => {
                tracing::trace!(%error, "Marker skipped");
                return MarkerUpdate::Skipped;
            }
        };
        let projected = Vector3::new(x, session.settings().marker_elevation, z);

        let update = match session.yaw_correction() {
            Some(correction) => {
                MarkerUpdate::Corrected(CompassReconciler.apply(projected, camera.position, correction))
            }
            None => MarkerUpdate::Projected(projected),
        };
        self.position = update.position();
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::LocalTangentPlane;

    #[test]
    fn test_arrow_requires_user_fix() {
        let mut plane = LocalTangentPlane::new();
        plane.set_reference(GeoPoint::new(7.651110, 51.933416));
        let arrow = NavigationArrow::new(GeoPoint::new(7.651058, 51.935260));
        let session = OrientationSession::default();

        assert!(arrow.update(&plane, &session, None).is_none());
        assert!(arrow.update(&plane, &session, Some(GeoPoint::new(7.651110, 51.933416))).is_some());
    }

    #[test]
    fn test_arrow_skips_without_reference() {
        let plane = LocalTangentPlane::new();
        let arrow = NavigationArrow::new(GeoPoint::new(7.651058, 51.935260));
        let session = OrientationSession::default();

        let user = Some(GeoPoint::new(7.651110, 51.933416));
        assert!(arrow.update(&plane, &session, user).is_none());
    }

    #[test]
    fn test_marker_projected_without_correction() {
        let mut plane = LocalTangentPlane::new();
        let user = GeoPoint::new(10.0, 50.0);
        plane.set_reference(user);

        let mut marker = TargetMarker::new(GeoPoint::new(10.0, 50.001));
        let session = OrientationSession::default();

        assert!(marker.position().is_none());
        let update = marker.update(&plane, &session, &Camera::default());
        let MarkerUpdate::Projected(position) = update else {
            panic!("unexpected update {:?}", update);
        };

        assert_eq!(position.y, 1.5);
        assert!(position.z < -100.0 && position.x.abs() < 1e-3, "position = {:?}", position);
        assert_eq!(marker.position(), Some(position));
    }

    #[test]
    fn test_marker_skipped_keeps_position() {
        let plane = LocalTangentPlane::new();
        let mut marker = TargetMarker::new(GeoPoint::new(10.0, 50.001));
        let session = OrientationSession::default();

        assert_eq!(marker.update(&plane, &session, &Camera::default()), MarkerUpdate::Skipped);
        assert!(marker.position().is_none());
    }
}
