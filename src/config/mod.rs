//! Application Configuration
//!
//! Recognition, preprocessing and engine settings stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::vision::{PreprocessingConfig, RecognitionOptions};

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Recognition options
    pub ocr: RecognitionOptions,
    /// Image preprocessing settings
    pub preprocessing: PreprocessingConfig,
    /// Tesseract engine settings
    pub tesseract: TesseractSettings,
}

/// Tesseract engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseractSettings {
    /// Executable name or path
    pub command: PathBuf,
}

impl Default for TesseractSettings {
    fn default() -> Self {
        Self {
            command: PathBuf::from("tesseract"),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default config file location (`<platform config dir>/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "kyc-ocr", "kyc-ocr")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the config at `path`, or the default location if it exists, or defaults
pub fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        _ => Ok(AppConfig::default()),
    }
}
