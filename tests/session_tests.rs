use ar_compass::host::{PermissionState, SensorHost};
use ar_compass::{
    Camera, CameraRotationChanged, CompassReconciler, ConnectStep, EngineSettings, GeoPoint, LocalTangentPlane,
    MarkerUpdate, NavigationArrow, OffsetMode, OrientationSession, PermissionError, PlatformKind,
    RawOrientationEvent, SampleOutcome, ScreenOrientation, SessionError, SessionState, TargetMarker,
    WorldProjector, wrap_pi,
};
use nalgebra::Vector3;
use std::cell::RefCell;
use std::rc::Rc;

const EPSILON: f32 = 1e-4;

/// Host with a scripted permission answer
struct FakeHost {
    screen: ScreenOrientation,
    requires_permission: bool,
    answer: Result<PermissionState, PermissionError>,
    requests: RefCell<u32>,
}

impl FakeHost {
    fn open() -> Self {
        Self {
            screen: ScreenOrientation::PORTRAIT,
            requires_permission: false,
            answer: Ok(PermissionState::Granted),
            requests: RefCell::new(0),
        }
    }

    fn asking(answer: Result<PermissionState, PermissionError>) -> Self {
        Self {
            requires_permission: true,
            answer,
            ..Self::open()
        }
    }

    fn landscape(mut self) -> Self {
        self.screen = ScreenOrientation::from_angle_degrees(90);
        self
    }
}

impl SensorHost for FakeHost {
    fn screen_orientation(&self) -> ScreenOrientation {
        self.screen
    }

    fn requires_motion_permission(&self) -> bool {
        self.requires_permission
    }

    async fn request_motion_permission(&self) -> Result<PermissionState, PermissionError> {
        *self.requests.borrow_mut() += 1;
        self.answer.clone()
    }
}

fn absolute_settings() -> EngineSettings {
    EngineSettings {
        platform: PlatformKind::AbsoluteHeading,
        ..Default::default()
    }
}

fn event() -> RawOrientationEvent {
    RawOrientationEvent::euler(30.0, 80.0, 5.0)
}

#[test]
fn test_connect_without_permission() {
    let host = FakeHost::open();
    let mut session = OrientationSession::default();

    pollster::block_on(session.connect(&host)).unwrap();

    assert_eq!(session.state(), SessionState::Enabled);
    assert_eq!(*host.requests.borrow(), 0);
}

#[test]
fn test_connect_reads_screen_orientation() {
    let host = FakeHost::open().landscape();
    let mut session = OrientationSession::default();

    pollster::block_on(session.connect(&host)).unwrap();
    assert_eq!(session.screen_orientation().angle_degrees, 90);
}

#[test]
fn test_connect_with_granted_permission() {
    let host = FakeHost::asking(Ok(PermissionState::Granted));
    let mut session = OrientationSession::default();

    pollster::block_on(session.connect(&host)).unwrap();

    assert!(session.is_enabled());
    assert_eq!(*host.requests.borrow(), 1);
}

#[test]
fn test_connect_twice_is_noop() {
    let host = FakeHost::asking(Ok(PermissionState::Granted));
    let mut session = OrientationSession::default();

    pollster::block_on(session.connect(&host)).unwrap();
    pollster::block_on(session.connect(&host)).unwrap();

    assert_eq!(*host.requests.borrow(), 1);
}

#[test]
fn test_permission_denied_stays_inert() {
    let host = FakeHost::asking(Ok(PermissionState::Denied));
    let mut session = OrientationSession::default();

    let result = pollster::block_on(session.connect(&host));
    assert_eq!(result, Err(SessionError::PermissionDenied));
    assert_eq!(session.state(), SessionState::Disconnected);

    assert_eq!(session.on_raw_event(&event()), SampleOutcome::Discarded);

    let mut camera = Camera::default();
    assert!(!session.update(&mut camera));
    assert_eq!(camera, Camera::default());
}

#[test]
fn test_permission_request_failure() {
    let failure = PermissionError::new("sensor api unavailable");
    let host = FakeHost::asking(Err(failure.clone()));
    let mut session = OrientationSession::default();

    let result = pollster::block_on(session.connect(&host));
    assert_eq!(result, Err(SessionError::PermissionRequestFailed(failure)));
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[test]
fn test_disconnect_cancels_pending_connect() {
    let host = FakeHost::asking(Ok(PermissionState::Granted));
    let mut session = OrientationSession::default();

    let ConnectStep::PermissionRequired(pending) = session.begin_connect(&host) else {
        panic!("permission should be required");
    };
    assert_eq!(session.state(), SessionState::AwaitingPermission);

    session.disconnect();
    let result = session.complete_connect(pending, Ok(PermissionState::Granted));

    assert_eq!(result, Err(SessionError::ConnectCancelled));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(session.on_raw_event(&event()), SampleOutcome::Discarded);
}

#[test]
fn test_restarted_connect_supersedes_ticket() {
    let host = FakeHost::asking(Ok(PermissionState::Granted));
    let mut session = OrientationSession::default();

    let ConnectStep::PermissionRequired(first) = session.begin_connect(&host) else {
        panic!("permission should be required");
    };
    let ConnectStep::PermissionRequired(second) = session.begin_connect(&host) else {
        panic!("permission should be required");
    };

    assert_eq!(
        session.complete_connect(first, Ok(PermissionState::Granted)),
        Err(SessionError::ConnectCancelled)
    );
    assert_eq!(session.complete_connect(second, Ok(PermissionState::Granted)), Ok(()));
    assert!(session.is_enabled());
}

#[test]
fn test_disconnect_before_connect() {
    let mut session = OrientationSession::default();
    session.disconnect();
    session.dispose();

    assert_eq!(session.state(), SessionState::Disconnected);
}

#[test]
fn test_stale_events_after_disconnect() {
    let mut session = OrientationSession::default();
    pollster::block_on(session.connect(&FakeHost::open())).unwrap();
    session.disconnect();

    assert_eq!(session.on_raw_event(&event()), SampleOutcome::Discarded);
    assert!(!session.on_screen_orientation_changed(ScreenOrientation::from_angle_degrees(90)));
    assert!(session.sample().is_none());
    assert_eq!(session.screen_orientation(), ScreenOrientation::PORTRAIT);
}

#[test]
fn test_rotation_during_permission_prompt() {
    let host = FakeHost::asking(Ok(PermissionState::Granted));
    let mut session = OrientationSession::new(absolute_settings());

    let ConnectStep::PermissionRequired(pending) = session.begin_connect(&host) else {
        panic!("permission should be required");
    };
    assert_eq!(session.screen_orientation(), ScreenOrientation::PORTRAIT);

    // User turns the phone while the prompt is showing
    assert!(session.on_screen_orientation_changed(ScreenOrientation::from_angle_degrees(90)));
    assert_eq!(session.complete_connect(pending, Ok(PermissionState::Granted)), Ok(()));

    assert_eq!(session.screen_orientation().angle_degrees, 90);
    session.on_raw_event(&event().with_compass_heading(45.0));
    assert!(session.yaw_correction().is_some(), "landscape gate sees the new angle");
}

#[test]
fn test_disable_freezes_camera() {
    let mut session = OrientationSession::default();
    pollster::block_on(session.connect(&FakeHost::open())).unwrap();
    session.on_raw_event(&event());

    let mut camera = Camera::default();
    session.update(&mut camera);
    let frozen = camera;

    session.disable();
    assert_eq!(session.on_raw_event(&RawOrientationEvent::euler(120.0, 60.0, 0.0)), SampleOutcome::Discarded);
    assert!(!session.update(&mut camera));
    assert_eq!(camera, frozen);

    // Screen rotations still tracked while frozen
    assert!(session.on_screen_orientation_changed(ScreenOrientation::from_angle_degrees(-90)));
    assert_eq!(session.screen_orientation().angle_degrees, 270);

    session.enable();
    assert!(session.update(&mut camera));
    assert_ne!(camera, frozen);
}

#[test]
fn test_accessors_follow_latest_sample() {
    let mut session = OrientationSession::default();
    pollster::block_on(session.connect(&FakeHost::open())).unwrap();

    session.on_raw_event(&RawOrientationEvent::euler(10.0, 20.0, 30.0));
    session.on_raw_event(&RawOrientationEvent::euler(40.0, 50.0, -60.0));

    assert!((session.heading_radians() - 40.0_f32.to_radians()).abs() < EPSILON);
    assert!((session.pitch_radians() - 50.0_f32.to_radians()).abs() < EPSILON);
    assert!((session.roll_radians() + 60.0_f32.to_radians()).abs() < EPSILON);
    assert!(session.absolute_heading().is_none());
}

#[test]
fn test_update_uses_sample_at_frame_start() {
    let mut session = OrientationSession::default();
    pollster::block_on(session.connect(&FakeHost::open())).unwrap();

    session.on_raw_event(&event());
    let mut camera = Camera::default();
    session.update(&mut camera);
    let first = camera;

    // A sample arriving between frames leaves the camera alone until the next update
    session.on_raw_event(&RawOrientationEvent::euler(200.0, 80.0, 5.0));
    assert_eq!(camera, first);

    session.update(&mut camera);
    assert!(camera.rotation.angle_to(&first.rotation) > 1.0);
}

#[test]
fn test_observers_notified_once_per_accepted_sample() {
    let seen: Rc<RefCell<Vec<CameraRotationChanged>>> = Rc::default();
    let mut session = OrientationSession::default();

    let sink = Rc::clone(&seen);
    let id = session.on_camera_rotation_changed(move |change| sink.borrow_mut().push(*change));

    // Not connected yet
    session.on_raw_event(&event());
    assert!(seen.borrow().is_empty());

    pollster::block_on(session.connect(&FakeHost::open())).unwrap();
    session.on_raw_event(&event());
    session.on_raw_event(&RawOrientationEvent::euler(31.0, 80.0, 5.0));
    assert_eq!(seen.borrow().len(), 2);

    let last = seen.borrow()[1];
    assert_eq!(Some(last.sample), session.sample());

    let mut camera = Camera::default();
    session.update(&mut camera);
    assert!(camera.rotation.angle_to(&last.rotation) < 1e-6);

    assert!(session.unsubscribe(id));
    assert!(!session.unsubscribe(id));
    session.on_raw_event(&event());
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn test_dispose_drops_observers() {
    let count = Rc::new(RefCell::new(0));
    let mut session = OrientationSession::default();

    let counter = Rc::clone(&count);
    session.on_camera_rotation_changed(move |_| *counter.borrow_mut() += 1);

    pollster::block_on(session.connect(&FakeHost::open())).unwrap();
    session.on_raw_event(&event());
    session.dispose();
    session.dispose();

    pollster::block_on(session.connect(&FakeHost::open())).unwrap();
    session.on_raw_event(&event());

    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_latched_offset_reset() {
    let settings = EngineSettings {
        offset_mode: OffsetMode::Latched,
        ..absolute_settings()
    };
    let mut session = OrientationSession::new(settings);
    pollster::block_on(session.connect(&FakeHost::open())).unwrap();

    // Compass north 90° counter-clockwise of the raw alpha
    session.on_raw_event(&RawOrientationEvent::euler(0.0, 80.0, 0.0).with_compass_heading(270.0));
    assert!((session.heading_radians() - 90.0_f32.to_radians()).abs() < EPSILON);

    // Held: a different compass reading does not move the offset
    session.on_raw_event(&RawOrientationEvent::euler(10.0, 80.0, 0.0).with_compass_heading(0.0));
    assert!((session.heading_radians() - 100.0_f32.to_radians()).abs() < EPSILON);

    session.reset_heading_offset();
    session.on_raw_event(&RawOrientationEvent::euler(10.0, 80.0, 0.0).with_compass_heading(0.0));
    let heading = wrap_pi(session.heading_radians());
    assert!(heading.abs() < EPSILON, "heading = {}", heading);
}

#[test]
fn test_yaw_correction_gate() {
    let mut session = OrientationSession::new(absolute_settings());
    pollster::block_on(session.connect(&FakeHost::open())).unwrap();

    session.on_raw_event(&event().with_compass_heading(45.0));
    assert!(session.yaw_correction().is_none(), "portrait never corrects");

    session.on_screen_orientation_changed(ScreenOrientation::from_angle_degrees(90));
    assert!(session.yaw_correction().is_some());

    session.on_raw_event(&event());
    assert!(session.yaw_correction().is_none(), "no compass reading");
}

#[test]
fn test_arrow_tracks_target() {
    let user = GeoPoint::new(10.0, 50.0);
    let mut plane = LocalTangentPlane::new();
    plane.set_reference(user);

    let mut session = OrientationSession::default();
    pollster::block_on(session.connect(&FakeHost::open())).unwrap();
    session.on_raw_event(&RawOrientationEvent::euler(0.0, 80.0, 0.0));

    // Target due north, facing north: arrow straight ahead
    let arrow = NavigationArrow::new(GeoPoint::new(10.0, 50.01));
    let yaw = arrow.update(&plane, &session, Some(user)).unwrap();
    assert!(yaw.abs() < EPSILON, "yaw = {}", yaw);

    // Target due east: quarter turn
    let arrow = NavigationArrow::new(GeoPoint::new(10.01, 50.0));
    let yaw = arrow.update(&plane, &session, Some(user)).unwrap();
    assert!((yaw + std::f32::consts::FRAC_PI_2).abs() < EPSILON, "yaw = {}", yaw);
}

#[test]
fn test_marker_correction_follows_gate() {
    let host = FakeHost::open().landscape();
    let mut plane = LocalTangentPlane::new();
    plane.set_reference(GeoPoint::new(10.0, 50.0));

    let mut session = OrientationSession::new(absolute_settings());
    pollster::block_on(session.connect(&host)).unwrap();
    session.on_raw_event(&event().with_compass_heading(45.0));

    let mut camera = Camera {
        position: Vector3::new(2.0, 1.5, -3.0),
        ..Default::default()
    };
    session.update(&mut camera);

    let target = GeoPoint::new(10.001, 50.001);
    let (x, z) = plane.project_to_world(&target).unwrap();
    let projected = Vector3::new(x, 1.5, z);

    let mut marker = TargetMarker::new(target);
    let MarkerUpdate::Corrected(corrected) = marker.update(&plane, &session, &camera) else {
        panic!("landscape with compass reading should correct");
    };

    let correction = session.yaw_correction().unwrap();
    let expected = CompassReconciler.apply(projected, camera.position, correction);
    assert!((corrected - expected).norm() < 1e-3, "corrected = {:?}", corrected);
    assert!(((corrected - camera.position).norm() - (projected - camera.position).norm()).abs() < 1e-2);
    assert!((corrected.y - 1.5).abs() < 1e-6);

    // Back to portrait: the uncorrected projection is restored
    session.on_screen_orientation_changed(ScreenOrientation::PORTRAIT);
    assert_eq!(marker.update(&plane, &session, &camera), MarkerUpdate::Projected(projected));
    assert_eq!(marker.position(), Some(projected));
}
