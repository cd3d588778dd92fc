use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pressmark_core::Settings;
use pressmark_logging::press_info;

/// Reads the settings file, or returns the defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings: Settings = toml::from_str(&content)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
    press_info!("Loaded settings from {}", path.display());
    Ok(settings)
}
