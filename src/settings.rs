//! Manager settings
//!
//! JSON-backed configuration for a [`crate::PackedCircleManager`]: bounds,
//! pass counts, padding and broad-phase choice. Values are taken as given;
//! nonsensical numbers produce degenerate motion, not errors.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{Bounds, BroadPhaseKind};

/// Errors from loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSettings {
    /// Logical simulation rectangle
    pub bounds: Bounds,
    /// Separation passes per `handle_collisions` call
    pub collision_passes: u32,
    /// Targeting passes per `push_all_circles_toward_target` call
    pub targeting_passes: u32,
    /// Separation reach multiplier
    pub collision_padding: f32,
    /// Candidate pair generation
    pub broad_phase: BroadPhaseKind,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            collision_passes: DEFAULT_COLLISION_PASSES,
            targeting_passes: DEFAULT_TARGETING_PASSES,
            collision_padding: DEFAULT_COLLISION_PADDING,
            broad_phase: BroadPhaseKind::AllPairs,
        }
    }
}

impl ManagerSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults (with a warning) on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{}; using default settings", err);
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Settings saved to {}", path.display());
        Ok(())
    }
}
