//! Loading watch settings from TOML.

use iniwatch_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::info;

use super::schema::{Settings, WatchSettings};
use super::validation;

/// Parse settings from a TOML string and validate them.
pub fn from_toml_str(content: &str) -> Result<WatchSettings, ConfigError> {
    let settings: Settings = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;
    validation::validate(&settings.watch)?;
    Ok(settings.watch)
}

/// Load settings from a specific TOML file.
pub fn load_from_path(path: &Path) -> Result<WatchSettings, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("failed to read {}: {e}", path.display())))?;
    let settings = from_toml_str(&content)?;
    info!("loaded watch settings from {}", path.display());
    Ok(settings)
}

/// Platform-specific default settings path.
///
/// On Linux: `~/.config/iniwatch/settings.toml`
pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::NotFound("could not determine config directory".into()))?;
    Ok(config_dir.join("iniwatch").join("settings.toml"))
}

/// Load settings from the default path, falling back to defaults when the
/// file does not exist.
pub fn load_default() -> Result<WatchSettings, ConfigError> {
    let path = default_settings_path()?;
    if !path.exists() {
        info!("no settings at {}, using defaults", path.display());
        return Ok(WatchSettings::default());
    }
    load_from_path(&path)
}
