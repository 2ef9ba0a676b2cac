//! Replays recorded orientation events through a session and prints what the
//! overlay would show: camera yaw, arrow yaw and marker position.
//!
//! Usage: cargo run --example replay [-- settings.toml]

use ar_compass::host::{PermissionState, SensorHost};
use ar_compass::{
    Camera, FrameHints, GeoPoint, LocalTangentPlane, MarkerUpdate, NavigationArrow, OrientationSession,
    PermissionError, RawOrientationEvent, ScreenOrientation, TargetMarker, compute_distance_meters, config,
    extract_yaw, initial_bearing_degrees,
};
use std::error::Error;
use tracing::info;

/// Phone held in landscape that asks before streaming motion events
struct RecordedPhone;

impl SensorHost for RecordedPhone {
    fn screen_orientation(&self) -> ScreenOrientation {
        ScreenOrientation::from_angle_degrees(90)
    }

    fn requires_motion_permission(&self) -> bool {
        true
    }

    async fn request_motion_permission(&self) -> Result<PermissionState, PermissionError> {
        Ok(PermissionState::Granted)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "ar_compass=debug,replay=info".into()),
        )
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => config::load_settings(path)?,
        None => config::from_toml_str(
            r#"
            platform = "absolute-heading"

            [heading_smoothing]
            far_weight = 0.5
            "#,
        )?,
    };

    let user = GeoPoint::new(7.651110, 51.933416);
    let target = GeoPoint::new(7.651058, 51.935260);
    let distance = compute_distance_meters(&user, &target);
    info!(
        distance_m = format!("{:.1}", distance),
        bearing_deg = format!("{:.1}", initial_bearing_degrees(&user, &target)),
        "Tracking target"
    );

    let mut session = OrientationSession::new(settings);
    pollster::block_on(session.connect(&RecordedPhone))?;

    let mut plane = LocalTangentPlane::new();
    plane.set_reference(user);
    let arrow = NavigationArrow::new(target);
    let mut marker = TargetMarker::new(target);
    let mut camera = Camera::default();

    let mut reader = csv::Reader::from_path("testdata/orientation_samples.csv")?;
    println!("frame,camera_yaw_deg,arrow_yaw_deg,marker_x,marker_z,corrected");

    for (frame, result) in reader.deserialize().enumerate() {
        let event: RawOrientationEvent = result?;
        session.on_raw_event(&event);
        session.update_with(
            &mut camera,
            FrameHints {
                theta: 0.0,
                target_distance_m: Some(distance),
            },
        );

        let arrow_yaw = arrow.update(&plane, &session, Some(user)).unwrap_or_default();
        let update = marker.update(&plane, &session, &camera);
        let Some(position) = update.position() else {
            continue;
        };

        println!(
            "{},{:.2},{:.2},{:.2},{:.2},{}",
            frame,
            extract_yaw(&camera.rotation).to_degrees(),
            arrow_yaw.to_degrees(),
            position.x,
            position.z,
            matches!(update, MarkerUpdate::Corrected(_)),
        );
    }

    session.dispose();
    Ok(())
}
