//! Viewer settings loaded from `settings.toml`.
//!
//! The imaging configuration is read once at startup and handed to the loader
//! explicitly; nothing about the decoder is configured globally.

use crate::error::Result;
use crate::model::FileSource;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "slicestack";

pub const DEFAULT_QUICK_JUMP: [usize; 3] = [1, 50, 100];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub imaging: ImagingConfig,
    /// Slice numbers offered in the quick navigation table.
    pub quick_jump: Vec<usize>,
    pub source: Option<FileSource>,
    pub window: WindowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            imaging: ImagingConfig::default(),
            quick_jump: DEFAULT_QUICK_JUMP.to_vec(),
            source: None,
            window: WindowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImagingConfig {
    /// Expand multi-frame files into one slice per frame.
    pub expand_multiframe: bool,
    /// Window monochrome frames with the VOI LUT stored in the file instead
    /// of stretching the raw min/max range.
    pub voi_lut: bool,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            expand_multiframe: true,
            voi_lut: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 720.0,
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the settings file from the platform config directory, falling back
/// to defaults when there is none.
pub fn load() -> Result<Config> {
    match default_config_path() {
        Some(path) if path.exists() => load_from_path(&path),
        _ => Ok(Config::default()),
    }
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    log::info!("Reading settings from {}", path.display());
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
