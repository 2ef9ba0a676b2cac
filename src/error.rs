//! Error types for the orientation engine
//!
//! None of these are fatal: every failure path degrades to holding the last
//! known (or identity) visual state.

use thiserror::Error;

/// Failure projecting a geographic point into the rendering frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The first geolocation fix has not arrived yet
    #[error("No initial position determined")]
    NoReferencePosition,
}

/// Host-side failure while asking for motion-sensor permission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to use device orientation: {reason}")]
pub struct PermissionError {
    pub reason: String,
}

impl PermissionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Outcome of a failed connect attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Motion sensor permission denied")]
    PermissionDenied,
    #[error("Motion sensor permission request failed")]
    PermissionRequestFailed(#[source] PermissionError),
    /// The session was disconnected while the permission request was pending
    #[error("Connect attempt superseded by disconnect")]
    ConnectCancelled,
}

/// Failure loading engine settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
