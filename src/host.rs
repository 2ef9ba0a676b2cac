//! Platform collaborators consumed by the orientation session

use crate::error::PermissionError;
use crate::types::ScreenOrientation;
use core::future::Future;

/// User's answer to a motion-sensor permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

/// Device services the session needs to connect
pub trait SensorHost {
    /// Current OS screen orientation
    fn screen_orientation(&self) -> ScreenOrientation;

    /// Whether motion sensors need an explicit user grant on this platform
    fn requires_motion_permission(&self) -> bool;

    /// Ask the user for motion-sensor access
    ///
    /// Only called when [`SensorHost::requires_motion_permission`] is true. The
    /// future may never resolve, in which case the session simply stays
    /// unsubscribed.
    fn request_motion_permission(&self) -> impl Future<Output = Result<PermissionState, PermissionError>>;
}
