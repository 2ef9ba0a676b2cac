//! Engine settings stored as TOML

use crate::error::ConfigError;
use crate::types::EngineSettings;
use std::path::Path;
use tracing::info;

/// Parse settings from TOML text
///
/// Missing keys take their default values, so an empty document yields
/// [`EngineSettings::default`].
///
/// # Example
/// ```
/// use ar_compass::config;
/// use ar_compass::{OffsetMode, PlatformKind};
///
/// let settings = config::from_toml_str(
///     r#"
///     platform = "absolute-heading"
///     offset_mode = "latched"
///     "#,
/// )
/// .unwrap();
/// assert_eq!(settings.platform, PlatformKind::AbsoluteHeading);
/// assert_eq!(settings.offset_mode, OffsetMode::Latched);
/// assert_eq!(settings.marker_elevation, 1.5);
/// ```
pub fn from_toml_str(contents: &str) -> Result<EngineSettings, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Load settings from disk, or return defaults if the file does not exist
pub fn load_settings(path: impl AsRef<Path>) -> Result<EngineSettings, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let settings = from_toml_str(&contents)?;
        info!(?path, "Loaded engine settings");
        Ok(settings)
    } else {
        info!(?path, "No settings found, using defaults");
        Ok(EngineSettings::default())
    }
}

/// Save settings to disk
pub fn save_settings(path: impl AsRef<Path>, settings: &EngineSettings) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let contents = toml::to_string_pretty(settings)?;
    std::fs::write(path, contents)?;
    info!(?path, "Saved engine settings");
    Ok(())
}
