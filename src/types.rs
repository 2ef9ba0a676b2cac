//! Core types and conventions for the orientation engine

use crate::math::{DEG_TO_RAD, wrap_two_pi};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Raw rotation event as delivered by the platform
///
/// All angles are in degrees. Any field may be missing; missing Euler
/// components are read as zero by the normaliser, while a missing
/// `compass_heading` means the platform has no absolute reading for this
/// event.
///
/// # Example
/// ```
/// use ar_compass::RawOrientationEvent;
///
/// let event = RawOrientationEvent {
///     alpha: Some(350.0),
///     beta: Some(80.0),
///     gamma: None,
///     compass_heading: Some(12.5),
/// };
/// assert!(event.gamma.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawOrientationEvent {
    /// Yaw about the device z axis in degrees
    pub alpha: Option<f32>,
    /// Front-to-back tilt in degrees
    pub beta: Option<f32>,
    /// Left-to-right tilt in degrees
    pub gamma: Option<f32>,
    /// Clockwise compass heading from north in degrees
    pub compass_heading: Option<f32>,
}

impl RawOrientationEvent {
    /// Event carrying only Euler angles
    pub fn euler(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
            compass_heading: None,
        }
    }

    /// Attach an absolute compass heading in degrees
    pub fn with_compass_heading(mut self, heading: f32) -> Self {
        self.compass_heading = Some(heading);
        self
    }
}

/// Canonical orientation sample in radians
///
/// `alpha` is in [0, 2π). On absolute-heading platforms it already contains
/// the compass offset; `absolute_heading` then holds the clockwise compass
/// heading of the same event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationSample {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub absolute_heading: Option<f32>,
}

/// Screen orientation reported by the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenOrientationKind {
    #[default]
    Portrait,
    PortraitUpsideDown,
    /// Content rotated 90°
    LandscapeLeft,
    /// Content rotated 270°
    LandscapeRight,
}

/// Rotation of rendered content relative to the device chassis
///
/// # Example
/// ```
/// use ar_compass::{ScreenOrientation, ScreenOrientationKind};
///
/// // Legacy platforms report -90 for the second landscape orientation
/// let screen = ScreenOrientation::from_angle_degrees(-90);
/// assert_eq!(screen.kind, ScreenOrientationKind::LandscapeRight);
/// assert_eq!(screen.angle_degrees, 270);
/// assert!(screen.is_landscape());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenOrientation {
    pub kind: ScreenOrientationKind,
    /// One of 0, 90, 180 or 270
    pub angle_degrees: u16,
}

impl ScreenOrientation {
    pub const PORTRAIT: Self = Self {
        kind: ScreenOrientationKind::Portrait,
        angle_degrees: 0,
    };

    /// Build from a platform angle, snapping to the nearest quarter turn
    pub fn from_angle_degrees(angle: i32) -> Self {
        let quarter_turns = ((angle as f32 / 90.0).round() as i32).rem_euclid(4);
        let kind = match quarter_turns {
            0 => ScreenOrientationKind::Portrait,
            1 => ScreenOrientationKind::LandscapeLeft,
            2 => ScreenOrientationKind::PortraitUpsideDown,
            _ => ScreenOrientationKind::LandscapeRight,
        };
        Self {
            kind,
            angle_degrees: (quarter_turns * 90) as u16,
        }
    }

    pub fn is_landscape(&self) -> bool {
        matches!(
            self.kind,
            ScreenOrientationKind::LandscapeLeft | ScreenOrientationKind::LandscapeRight
        )
    }

    pub fn angle_radians(&self) -> f32 {
        wrap_two_pi(self.angle_degrees as f32 * DEG_TO_RAD)
    }
}

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Virtual camera pose in the rendering frame
///
/// Only the rotation is written by the engine; the position is owned by the
/// scene and read as the pivot for compass corrections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

/// Platform capability, selected once per session
///
/// # Conventions
/// - **AbsoluteHeading**: every rotation event may carry an independent
///   compass heading, which is folded into `alpha`
/// - **RelativeHeading**: events carry an alpha that is already referenced
///   to north but may wrap below zero; no compass reading is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformKind {
    AbsoluteHeading,
    #[default]
    RelativeHeading,
}

/// How the compass offset is maintained on absolute-heading platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OffsetMode {
    /// Recompute the offset from every event carrying a compass heading
    #[default]
    PerSample,
    /// Capture the offset from the first event carrying a compass heading
    /// and hold it until reset
    Latched,
}

/// Source of the camera's yaw on absolute-heading platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum YawSource {
    /// Use the yaw of the sensor quaternion as built
    #[default]
    Sensor,
    /// Replace the yaw with the live compass heading
    Compass,
}

/// Distance-dependent blend weight for camera heading updates
///
/// Only applied on relative-heading platforms. A weight of 1.0 applies the
/// new rotation outright; smaller weights move the camera part of the way.
///
/// # Example
/// ```
/// use ar_compass::HeadingSmoothing;
///
/// let smoothing = HeadingSmoothing::default();
/// assert_eq!(smoothing.blend_weight(0.0), 1.0);
/// assert_eq!(smoothing.blend_weight(10_000.0), smoothing.far_weight);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingSmoothing {
    /// Distance in meters at or below which no smoothing is applied
    pub near_distance_m: f64,
    /// Distance in meters at or beyond which `far_weight` is used
    pub far_distance_m: f64,
    /// Blend weight for distant targets, in (0, 1]
    pub far_weight: f32,
}

impl Default for HeadingSmoothing {
    fn default() -> Self {
        Self {
            near_distance_m: 20.0,
            far_distance_m: 500.0,
            far_weight: 0.2,
        }
    }
}

impl HeadingSmoothing {
    pub fn blend_weight(&self, distance_m: f64) -> f32 {
        let far_weight = self.far_weight.clamp(f32::EPSILON, 1.0);
        if distance_m.is_nan() || distance_m <= self.near_distance_m {
            return 1.0;
        }
        if distance_m >= self.far_distance_m {
            return far_weight;
        }

        let span = self.far_distance_m - self.near_distance_m;
        let t = ((distance_m - self.near_distance_m) / span) as f32;
        1.0 + (far_weight - 1.0) * t
    }
}

/// Engine settings
///
/// # Example
/// ```
/// use ar_compass::{EngineSettings, PlatformKind, YawSource};
///
/// let settings = EngineSettings {
///     platform: PlatformKind::AbsoluteHeading,
///     camera_yaw_source: YawSource::Compass,
///     ..Default::default()
/// };
/// assert_eq!(settings.marker_elevation, 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Normaliser strategy for this device
    pub platform: PlatformKind,
    /// Offset maintenance on absolute-heading platforms
    pub offset_mode: OffsetMode,
    /// Where the camera yaw comes from on absolute-heading platforms
    pub camera_yaw_source: YawSource,
    /// Height of projected markers in the rendering frame
    pub marker_elevation: f32,
    /// Optional heading smoothing on relative-heading platforms
    pub heading_smoothing: Option<HeadingSmoothing>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            platform: PlatformKind::default(),
            offset_mode: OffsetMode::default(),
            camera_yaw_source: YawSource::default(),
            marker_elevation: 1.5,
            heading_smoothing: None,
        }
    }
}
