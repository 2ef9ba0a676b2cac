use ar_compass::compass::{compass_yaw, yaw_correction};
use ar_compass::host::{PermissionState, SensorHost};
use ar_compass::{
    Camera, CompassReconciler, EngineSettings, Normalizer, OffsetMode, OrientationSession, PermissionError,
    PlatformKind, RawOrientationEvent, SampleNormalizer, ScreenOrientation, SessionState, build_quaternion,
    compute_bearing, haversine,
};
use nalgebra::{UnitQuaternion, Vector3};
use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI};

const EPSILON: f32 = 1e-5;

struct Immediate;

impl SensorHost for Immediate {
    fn screen_orientation(&self) -> ScreenOrientation {
        ScreenOrientation::PORTRAIT
    }

    fn requires_motion_permission(&self) -> bool {
        false
    }

    async fn request_motion_permission(&self) -> Result<PermissionState, PermissionError> {
        Ok(PermissionState::Granted)
    }
}

/// The rest pose is the fixed screen-facing correction alone
#[test]
fn test_rest_pose_quaternion() {
    let q = build_quaternion(0.0, 0.0, 0.0, 0.0);

    assert_eq!(q.w, FRAC_1_SQRT_2);
    assert_eq!(q.i, -FRAC_1_SQRT_2);
    assert_eq!(q.j, 0.0);
    assert_eq!(q.k, 0.0);
}

/// Target due east of a user facing north lies a quarter turn to the right,
/// which after the arrow's half-turn rest pose wraps to -π/2
#[test]
fn test_bearing_target_east() {
    let user = Vector3::new(0.0, 1.5, 0.0);
    let target = Vector3::new(10.0, 1.5, 0.0);

    let relative = compute_bearing(&user, &target, 0.0, 0.0);
    assert!((relative + FRAC_PI_2).abs() < EPSILON, "relative = {}", relative);
}

#[test]
fn test_haversine_coincident_is_zero() {
    assert_eq!(haversine(51.935260, 7.651058, 51.935260, 7.651058), 0.0);
}

#[test]
fn test_haversine_scenario_pair() {
    let distance = haversine(51.935260, 7.651058, 51.933416, 7.651110);
    assert!((distance - 205.07).abs() < 0.5, "distance = {}", distance);
}

#[test]
fn test_reconciler_quarter_turn() {
    let heading = 90.0_f32.to_radians();
    assert!((compass_yaw(heading) - 3.0 * PI / 2.0).abs() < EPSILON);

    let delta = yaw_correction(0.0, heading);
    assert!((delta + FRAC_PI_2).abs() < EPSILON, "delta = {}", delta);

    let camera = Vector3::new(1.0, 1.5, 1.0);
    let marker = Vector3::new(0.0, 1.5, -10.0);
    let corrected = CompassReconciler.apply(marker, camera, delta);

    let expected_offset = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), delta) * (marker - camera);
    let offset = corrected - camera;
    assert!((offset - expected_offset).norm() < 1e-4, "offset = {:?}", offset);
    assert!((corrected - Vector3::new(12.0, 1.5, 0.0)).norm() < 1e-4, "corrected = {:?}", corrected);
}

#[test]
fn test_negative_alpha_wraps() {
    let mut normalizer = Normalizer::for_platform(PlatformKind::RelativeHeading, OffsetMode::PerSample);
    let sample = normalizer.normalize(&RawOrientationEvent::euler(-10.0, 0.0, 0.0));

    assert!((sample.alpha - 350.0_f32.to_radians()).abs() < EPSILON, "alpha = {}", sample.alpha);
}

#[test]
fn test_disconnect_idempotent_and_update_noop() {
    let mut session = OrientationSession::new(EngineSettings::default());
    pollster::block_on(session.connect(&Immediate)).unwrap();
    session.on_raw_event(&RawOrientationEvent::euler(30.0, 80.0, 5.0));

    let mut camera = Camera::default();
    assert!(session.update(&mut camera));
    let frozen = camera;

    session.disconnect();
    let once = (session.state(), session.sample(), session.heading_radians());
    session.disconnect();
    let twice = (session.state(), session.sample(), session.heading_radians());

    assert_eq!(once, twice);
    assert_eq!(twice.0, SessionState::Disconnected);
    assert!(twice.1.is_none());

    assert!(!session.update(&mut camera));
    assert_eq!(camera, frozen);
}

#[test]
fn test_zero_components_are_valid() {
    let mut normalizer = Normalizer::for_platform(PlatformKind::RelativeHeading, OffsetMode::PerSample);
    let missing = normalizer.normalize(&RawOrientationEvent::default());
    let zero = normalizer.normalize(&RawOrientationEvent::euler(0.0, 0.0, 0.0));

    assert_eq!(missing, zero);
    assert_eq!((zero.alpha, zero.beta, zero.gamma), (0.0, 0.0, 0.0));
}
