//! User configuration for the sketch pad.

use crate::capture::CommitPolicy;
use crate::model::StrokeColor;
use crate::tools::{PenSize, ToolKind, ToolSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Persisted preferences. Every field has a default, so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Initial pen color.
    pub pen_color: StrokeColor,
    /// Initial pen width.
    pub pen_size: PenSize,
    /// Whether clicks without a drag are kept as strokes.
    pub commit_policy: CommitPolicy,
    /// Directory for file-backed sketches; the platform data dir if unset.
    pub storage_dir: Option<PathBuf>,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            pen_color: StrokeColor::BLACK,
            pen_size: PenSize::Medium,
            commit_policy: CommitPolicy::DropTrivial,
            storage_dir: None,
        }
    }
}

impl SketchConfig {
    /// Tool settings a new session starts with. Sessions always start on the pen.
    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings::new(ToolKind::Pen, self.pen_color, self.pen_size)
    }

    /// Default config file location (`<config dir>/sketchpad/config.json`).
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("sketchpad").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load from a JSON file, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
