//! Orientation session controller
//!
//! Owns the canonical sample and screen state for one AR session, drives the
//! connect/permission lifecycle and applies the device rotation to the camera
//! once per frame.

use crate::compass::{CompassReconciler, compass_yaw};
use crate::error::{PermissionError, SessionError};
use crate::host::{PermissionState, SensorHost};
use crate::normalize::{Normalizer, SampleNormalizer};
use crate::quaternion::{build_quaternion, with_yaw};
use crate::types::{
    Camera, EngineSettings, OrientationSample, PlatformKind, RawOrientationEvent, ScreenOrientation,
    YawSource,
};
use core::fmt;
use nalgebra::UnitQuaternion;

/// Tolerance below which two rotations are treated as identical when blending
const SLERP_EPSILON: f32 = 1e-6;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not subscribed to sensor events
    Disconnected,
    /// Waiting for the user to answer the permission request
    AwaitingPermission,
    /// Subscribed and applying rotations
    Enabled,
    /// Subscribed but frozen; samples are discarded
    Disabled,
}

/// Result of starting a connect attempt
#[derive(Debug, PartialEq, Eq)]
pub enum ConnectStep {
    /// Subscribed without needing permission
    Connected,
    /// Permission must be requested; pass the ticket to
    /// [`OrientationSession::complete_connect`] with the answer
    PermissionRequired(PendingConnect),
}

/// Ticket for an in-flight permission request
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct PendingConnect {
    generation: u64,
}

/// What happened to a raw sensor event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    Accepted(OrientationSample),
    /// The session was not enabled when the event arrived
    Discarded,
}

/// Notification sent after every accepted sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRotationChanged {
    pub sample: OrientationSample,
    /// Camera rotation built from the sample and the current screen state
    pub rotation: UnitQuaternion<f32>,
}

/// Handle for removing a rotation observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Per-frame inputs to [`OrientationSession::update_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameHints {
    /// Extra yaw in radians added on relative-heading platforms
    pub theta: f32,
    /// Distance to the tracked target, used for heading smoothing
    pub target_distance_m: Option<f64>,
}

type Observer = Box<dyn FnMut(&CameraRotationChanged)>;

/// Controller for a single AR orientation session
///
/// # Example
/// ```
/// use ar_compass::{Camera, EngineSettings, OrientationSession, RawOrientationEvent, SessionState};
/// use ar_compass::host::{PermissionState, SensorHost};
/// use ar_compass::{PermissionError, ScreenOrientation};
///
/// struct Desktop;
///
/// impl SensorHost for Desktop {
///     fn screen_orientation(&self) -> ScreenOrientation {
///         ScreenOrientation::PORTRAIT
///     }
///     fn requires_motion_permission(&self) -> bool {
///         false
///     }
///     async fn request_motion_permission(&self) -> Result<PermissionState, PermissionError> {
///         Ok(PermissionState::Granted)
///     }
/// }
///
/// let mut session = OrientationSession::new(EngineSettings::default());
/// pollster::block_on(session.connect(&Desktop)).unwrap();
/// assert_eq!(session.state(), SessionState::Enabled);
///
/// session.on_raw_event(&RawOrientationEvent::euler(30.0, 90.0, 0.0));
///
/// let mut camera = Camera::default();
/// assert!(session.update(&mut camera));
/// ```
pub struct OrientationSession {
    settings: EngineSettings,
    normalizer: Normalizer,
    state: SessionState,
    /// Bumped on every connect attempt and disconnect to expire tickets
    generation: u64,
    sample: Option<OrientationSample>,
    screen: ScreenOrientation,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl OrientationSession {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            normalizer: Normalizer::for_platform(settings.platform, settings.offset_mode),
            state: SessionState::Disconnected,
            generation: 0,
            sample: None,
            screen: ScreenOrientation::default(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == SessionState::Enabled
    }

    pub fn platform(&self) -> PlatformKind {
        self.normalizer.platform()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Connect, requesting permission first where the host requires it
    ///
    /// Failures leave the session disconnected and are returned for the
    /// caller to handle; nothing here panics or blocks the render loop.
    pub async fn connect<H: SensorHost>(&mut self, host: &H) -> Result<(), SessionError> {
        match self.begin_connect(host) {
            ConnectStep::Connected => Ok(()),
            ConnectStep::PermissionRequired(pending) => {
                let outcome = host.request_motion_permission().await;
                self.complete_connect(pending, outcome)
            }
        }
    }

    /// First half of [`OrientationSession::connect`]
    ///
    /// Reads the screen orientation once. Connecting an already connected
    /// session is a no-op; starting over while a request is pending expires
    /// the earlier ticket.
    pub fn begin_connect<H: SensorHost>(&mut self, host: &H) -> ConnectStep {
        if matches!(self.state, SessionState::Enabled | SessionState::Disabled) {
            return ConnectStep::Connected;
        }

        self.screen = host.screen_orientation();
        self.generation += 1;

        if host.requires_motion_permission() {
            tracing::debug!(generation = self.generation, "Requesting motion sensor permission");
            self.state = SessionState::AwaitingPermission;
            ConnectStep::PermissionRequired(PendingConnect {
                generation: self.generation,
            })
        } else {
            self.subscribe();
            ConnectStep::Connected
        }
    }

    /// Second half of [`OrientationSession::connect`]
    pub fn complete_connect(
        &mut self,
        pending: PendingConnect,
        outcome: Result<PermissionState, PermissionError>,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::AwaitingPermission || pending.generation != self.generation {
            tracing::debug!(
                ticket = pending.generation,
                current = self.generation,
                "Ignoring permission answer for a superseded connect"
            );
            return Err(SessionError::ConnectCancelled);
        }

        match outcome {
            Ok(PermissionState::Granted) => {
                self.subscribe();
                Ok(())
            }
            Ok(PermissionState::Denied) => {
                self.state = SessionState::Disconnected;
                tracing::warn!("Motion sensor permission denied, orientation stays frozen");
                Err(SessionError::PermissionDenied)
            }
            Err(error) => {
                self.state = SessionState::Disconnected;
                tracing::warn!(%error, "Motion sensor permission request failed");
                Err(SessionError::PermissionRequestFailed(error))
            }
        }
    }

    fn subscribe(&mut self) {
        self.state = SessionState::Enabled;
        tracing::info!(
            platform = ?self.normalizer.platform(),
            screen_angle = self.screen.angle_degrees,
            "Orientation session connected"
        );
    }

    /// Unsubscribe and clear the sample; safe to call repeatedly
    pub fn disconnect(&mut self) {
        self.generation += 1;
        if self.state != SessionState::Disconnected {
            tracing::info!("Orientation session disconnected");
        }
        self.state = SessionState::Disconnected;
        self.sample = None;
        self.normalizer.reset();
    }

    /// Disconnect and drop every observer
    pub fn dispose(&mut self) {
        self.disconnect();
        if !self.observers.is_empty() {
            tracing::info!(observers = self.observers.len(), "Orientation session disposed");
            self.observers.clear();
        }
    }

    /// Resume applying rotations; only meaningful while connected
    pub fn enable(&mut self) {
        if self.state == SessionState::Disabled {
            self.state = SessionState::Enabled;
        }
    }

    /// Freeze the camera without unsubscribing
    pub fn disable(&mut self) {
        if self.state == SessionState::Enabled {
            self.state = SessionState::Disabled;
        }
    }

    /// Forget the compass offset so the next reading recomputes it
    pub fn reset_heading_offset(&mut self) {
        self.normalizer.reset();
    }

    /// Sensor callback entry point
    pub fn on_raw_event(&mut self, event: &RawOrientationEvent) -> SampleOutcome {
        if self.state != SessionState::Enabled {
            tracing::trace!(state = ?self.state, "Discarding stale orientation event");
            return SampleOutcome::Discarded;
        }

        let sample = self.normalizer.normalize(event);
        self.sample = Some(sample);

        let change = CameraRotationChanged {
            sample,
            rotation: self.camera_rotation(&sample, 0.0),
        };
        for (_, observer) in self.observers.iter_mut() {
            observer(&change);
        }

        SampleOutcome::Accepted(sample)
    }

    /// Screen rotation callback entry point
    ///
    /// Tracked from the start of a connect attempt, including while the
    /// permission prompt is showing. Returns false when the session is
    /// disconnected and the change was ignored.
    pub fn on_screen_orientation_changed(&mut self, screen: ScreenOrientation) -> bool {
        if self.state == SessionState::Disconnected {
            tracing::trace!(state = ?self.state, "Discarding stale screen orientation change");
            return false;
        }
        self.screen = screen;
        true
    }

    /// Register an observer notified once per accepted sample
    pub fn on_camera_rotation_changed<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&CameraRotationChanged) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Remove an observer; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn screen_orientation(&self) -> ScreenOrientation {
        self.screen
    }

    /// Latest canonical sample
    pub fn sample(&self) -> Option<OrientationSample> {
        self.sample
    }

    /// Offset-corrected alpha of the latest sample in radians, 0 without one
    pub fn heading_radians(&self) -> f32 {
        self.sample.map_or(0.0, |sample| sample.alpha)
    }

    pub fn pitch_radians(&self) -> f32 {
        self.sample.map_or(0.0, |sample| sample.beta)
    }

    pub fn roll_radians(&self) -> f32 {
        self.sample.map_or(0.0, |sample| sample.gamma)
    }

    /// Clockwise compass heading of the latest sample, if the platform gave one
    pub fn absolute_heading(&self) -> Option<f32> {
        self.sample.and_then(|sample| sample.absolute_heading)
    }

    /// Marker yaw correction for the latest sample and screen state
    pub fn yaw_correction(&self) -> Option<f32> {
        let sample = self.sample?;
        CompassReconciler.correction(&sample, &self.screen)
    }

    /// Apply the latest sample to the camera rotation
    ///
    /// Returns false, leaving the camera untouched, when the session is not
    /// enabled or no sample has arrived yet.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        self.update_with(camera, FrameHints::default())
    }

    /// [`OrientationSession::update`] with per-frame hints
    ///
    /// The sample is read once on entry; events arriving after this call take
    /// effect on the next frame.
    pub fn update_with(&mut self, camera: &mut Camera, hints: FrameHints) -> bool {
        if self.state != SessionState::Enabled {
            return false;
        }
        let Some(sample) = self.sample else {
            return false;
        };

        let target = self.camera_rotation(&sample, hints.theta);
        let weight = self.blend_weight(hints.target_distance_m);

        camera.rotation = if weight >= 1.0 {
            target
        } else {
            camera
                .rotation
                .try_slerp(&target, weight, SLERP_EPSILON)
                .unwrap_or(target)
        };
        true
    }

    fn camera_rotation(&self, sample: &OrientationSample, theta: f32) -> UnitQuaternion<f32> {
        let screen_angle = self.screen.angle_radians();

        match self.normalizer.platform() {
            PlatformKind::RelativeHeading => {
                build_quaternion(sample.alpha + theta, sample.beta, sample.gamma, screen_angle)
            }
            PlatformKind::AbsoluteHeading => {
                let rotation = build_quaternion(sample.alpha, sample.beta, sample.gamma, screen_angle);
                match (self.settings.camera_yaw_source, sample.absolute_heading) {
                    (YawSource::Compass, Some(heading)) => with_yaw(&rotation, compass_yaw(heading)),
                    _ => rotation,
                }
            }
        }
    }

    fn blend_weight(&self, target_distance_m: Option<f64>) -> f32 {
        if self.normalizer.platform() != PlatformKind::RelativeHeading {
            return 1.0;
        }
        match (self.settings.heading_smoothing, target_distance_m) {
            (Some(smoothing), Some(distance)) => smoothing.blend_weight(distance),
            _ => 1.0,
        }
    }
}

impl Default for OrientationSession {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl fmt::Debug for OrientationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrientationSession")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("sample", &self.sample)
            .field("screen", &self.screen)
            .field("observers", &self.observers.len())
            .finish()
    }
}
