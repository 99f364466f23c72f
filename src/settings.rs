//! Race configuration
//!
//! Loaded from a JSON file by the native binary; every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::{AiError, Difficulty};
use crate::track::TrackParams;

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Driver(#[from] AiError),
}

/// Track layout presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrackPreset {
    Sprint,
    #[default]
    Standard,
    Endurance,
}

impl TrackPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackPreset::Sprint => "Sprint",
            TrackPreset::Standard => "Standard",
            TrackPreset::Endurance => "Endurance",
        }
    }

    pub fn params(&self) -> TrackParams {
        match self {
            TrackPreset::Sprint => TrackParams::sprint(),
            TrackPreset::Standard => TrackParams::default(),
            TrackPreset::Endurance => TrackParams::endurance(),
        }
    }
}

/// Settings for one race
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    /// Track generation seed
    pub track_seed: u32,
    /// Seed for AI driver streams
    pub race_seed: u64,
    pub laps: u32,
    /// Explicit track parameters; the preset is used when absent
    pub track: Option<TrackParams>,
    pub preset: TrackPreset,
    /// One entry per AI car, by name ("easy", "hard", ...)
    pub drivers: Vec<String>,
    /// Hard stop for headless runs (seconds of simulated time)
    pub time_limit: f32,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            track_seed: 1,
            race_seed: 1,
            laps: 2,
            track: None,
            preset: TrackPreset::Standard,
            drivers: vec![
                "expert".to_string(),
                "hard".to_string(),
                "medium".to_string(),
                "easy".to_string(),
            ],
            time_limit: 600.0,
        }
    }
}

impl RaceSettings {
    /// Create settings from a track preset
    pub fn from_preset(preset: TrackPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Track parameters after applying the preset
    pub fn track_params(&self) -> TrackParams {
        self.track.clone().unwrap_or_else(|| self.preset.params())
    }

    /// Parsed driver difficulties; any unknown name fails the whole list
    pub fn difficulties(&self) -> Result<Vec<Difficulty>, AiError> {
        self.drivers.iter().map(|d| d.parse()).collect()
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.difficulties()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
