//! AR Compass - orientation and geospatial bearing engine for location-based AR
//!
//! Turns platform-inconsistent device rotation events into a stable camera
//! rotation, reconciles the sensor's idea of north with a live compass
//! heading, and computes on-screen bearings and great-circle distances to
//! geographic targets.
//!
//! # Features
//!
//! - Per-platform sample normalisation selected once per session
//! - Device-orientation quaternion for a Y-X-Z render camera
//! - Compass yaw correction for world-anchored markers
//! - Screen-rotation compensated relative bearings
//! - Haversine distance and initial bearing
//! - Session lifecycle with async permission handling and observers
//!
//! # Quick Start
//!
//! ```rust
//! use ar_compass::{
//!     Camera, EngineSettings, GeoPoint, LocalTangentPlane, NavigationArrow, OrientationSession,
//!     PermissionError, RawOrientationEvent, ScreenOrientation,
//! };
//! use ar_compass::host::{PermissionState, SensorHost};
//!
//! struct Phone;
//!
//! impl SensorHost for Phone {
//!     fn screen_orientation(&self) -> ScreenOrientation {
//!         ScreenOrientation::PORTRAIT
//!     }
//!     fn requires_motion_permission(&self) -> bool {
//!         true
//!     }
//!     async fn request_motion_permission(&self) -> Result<PermissionState, PermissionError> {
//!         Ok(PermissionState::Granted)
//!     }
//! }
//!
//! let mut session = OrientationSession::new(EngineSettings::default());
//! pollster::block_on(session.connect(&Phone)).unwrap();
//!
//! // Sensor callback
//! session.on_raw_event(&RawOrientationEvent::euler(45.0, 80.0, 2.0));
//!
//! // Animation tick
//! let mut camera = Camera::default();
//! session.update(&mut camera);
//!
//! let user = GeoPoint::new(7.651110, 51.933416);
//! let mut plane = LocalTangentPlane::new();
//! plane.set_reference(user);
//!
//! let arrow = NavigationArrow::new(GeoPoint::new(7.651058, 51.935260));
//! let yaw = arrow.update(&plane, &session, Some(user));
//! assert!(yaw.is_some());
//! ```

mod bearing;
pub mod compass;
pub mod config;
mod distance;
mod error;
pub mod host;
mod math;
mod navigation;
mod normalize;
mod offset;
mod projection;
mod quaternion;
mod session;
mod types;

// Re-export all public types and functions
pub use bearing::{compute_bearing, compute_relative_bearing};
pub use compass::CompassReconciler;
pub use distance::{EARTH_RADIUS_M, compute_distance_meters, haversine, initial_bearing_degrees};
pub use error::{ConfigError, PermissionError, ProjectionError, SessionError};
pub use math::{DEG_TO_RAD, QuaternionExt, RAD_TO_DEG, Vector3Ext, wrap_pi, wrap_two_pi};
pub use navigation::{MarkerUpdate, NavigationArrow, TargetMarker};
pub use normalize::{AbsoluteHeadingPlatform, Normalizer, RelativeHeadingPlatform, SampleNormalizer};
pub use offset::HeadingOffset;
pub use projection::{LocalTangentPlane, WorldProjector};
pub use quaternion::{build_quaternion, extract_yaw, sample_quaternion, screen_facing_correction, with_yaw};
pub use session::{
    CameraRotationChanged, ConnectStep, FrameHints, OrientationSession, PendingConnect, SampleOutcome,
    SessionState, SubscriptionId,
};
pub use types::*;
