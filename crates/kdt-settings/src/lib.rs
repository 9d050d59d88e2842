//! Persisted placement settings.
//!
//! Settings are plain values: [`SettingsStore::load`] and
//! [`SettingsStore::save`] are the only places that touch the file system, and
//! [`Settings::to_config`] turns a loaded value into a validated
//! [`PlacementConfig`] for one run.
//!
//! # File Location
//!
//! - `$KDT_PLACER_CONFIG_DIR/settings.json` when the variable is set
//! - Linux: `~/.config/kdt-placer/settings.json`
//! - macOS: `~/Library/Application Support/kdt-placer/settings.json`
//! - Windows: `%APPDATA%\kdt-placer\settings.json`

use std::fs;
use std::path::{Path, PathBuf};

use kdt_pcb::{ComponentSpec, ConfigError, DesignatorSource, PlacementConfig, Side};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Overrides the settings directory.
pub const CONFIG_DIR_ENV: &str = "KDT_PLACER_CONFIG_DIR";

const APP_DIR: &str = "kdt-placer";
const FILE_NAME: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to determine config directory")]
    NoConfigDir,

    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write settings file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Everything remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last layout file placed.
    pub json_file: Option<PathBuf>,
    pub step_x_mm: f64,
    pub step_y_mm: f64,
    pub ref_unit_px: f64,
    pub offset_x_mm: f64,
    pub offset_y_mm: f64,
    pub invert_rotation: bool,
    pub designator: DesignatorSource,
    pub switch: ComponentSpec,
    pub diode: ComponentSpec,
    pub additional: Vec<ComponentSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&PlacementConfig::default(), None)
    }
}

impl Settings {
    /// Capture a run configuration. The first associated component is stored as
    /// the diode; a config without one stores a disabled default diode.
    #[must_use]
    pub fn from_config(config: &PlacementConfig, json_file: Option<PathBuf>) -> Self {
        let mut associated = config.associated.iter().cloned();
        let diode = associated.next().unwrap_or_else(default_diode);
        Self {
            json_file,
            step_x_mm: config.step_x_mm,
            step_y_mm: config.step_y_mm,
            ref_unit_px: config.ref_unit_px,
            offset_x_mm: config.offset_x_mm,
            offset_y_mm: config.offset_y_mm,
            invert_rotation: config.invert_rotation,
            designator: config.designator,
            switch: config.switch.clone(),
            diode,
            additional: associated.collect(),
        }
    }

    /// Build the run configuration. Fails on any value the transform cannot use.
    pub fn to_config(&self) -> Result<PlacementConfig, ConfigError> {
        let config = PlacementConfig {
            step_x_mm: self.step_x_mm,
            step_y_mm: self.step_y_mm,
            ref_unit_px: self.ref_unit_px,
            offset_x_mm: self.offset_x_mm,
            offset_y_mm: self.offset_y_mm,
            invert_rotation: self.invert_rotation,
            designator: self.designator,
            switch: self.switch.clone(),
            associated: std::iter::once(self.diode.clone())
                .chain(self.additional.iter().cloned())
                .collect(),
        };
        config.validate()?;
        Ok(config)
    }
}

fn default_diode() -> ComponentSpec {
    ComponentSpec::new("Diode", "D{}")
        .with_offset(0.0, 5.0)
        .on_side(Side::Back)
        .disabled()
}

/// A settings file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The per-user settings file.
    pub fn default_location() -> Result<Self, SettingsError> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or(SettingsError::NoConfigDir)?
                .join(APP_DIR),
        };
        Ok(Self::at(dir.join(FILE_NAME)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load settings, or defaults when the file does not exist yet.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| SettingsError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Write `settings`, creating the directory if needed. The file is replaced
    /// atomically through a temporary sibling.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|source| SettingsError::Write {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }

        let content = serde_json::to_string_pretty(settings).map_err(SettingsError::Serialize)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(|source| SettingsError::Write {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "saved settings");
        Ok(())
    }

    /// Remove the settings file so the next load yields defaults.
    pub fn reset(&self) -> Result<(), SettingsError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| SettingsError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_place_a_back_side_diode() {
        let s = Settings::default();
        assert_eq!(s.step_x_mm, 19.05);
        assert_eq!(s.step_y_mm, 19.05);
        assert_eq!(s.ref_unit_px, 60.0);
        assert_eq!(s.switch.pattern, "SW{}");
        assert_eq!(s.diode.pattern, "D{}");
        assert_eq!(s.diode.offset(), [0.0, 5.0]);
        assert_eq!(s.diode.side, Side::Back);
        assert!(s.diode.enabled);
        assert!(s.additional.is_empty());
    }

    #[test]
    fn config_round_trip() {
        let mut s = Settings::default();
        s.additional.push(ComponentSpec::new("LED", "LED{}").with_offset(0.0, -4.7));
        let config = s.to_config().unwrap();
        assert_eq!(config.associated.len(), 2);
        assert_eq!(Settings::from_config(&config, None), s);
    }

    #[test]
    fn config_without_associated_keeps_a_disabled_diode() {
        let config = PlacementConfig {
            associated: Vec::new(),
            ..PlacementConfig::default()
        };
        let s = Settings::from_config(&config, None);
        assert!(!s.diode.enabled);
        assert_eq!(s.to_config().unwrap().components().count(), 1);
    }

    #[test]
    fn invalid_values_surface_as_config_errors() {
        let s = Settings {
            ref_unit_px: -60.0,
            ..Settings::default()
        };
        assert!(matches!(
            s.to_config(),
            Err(ConfigError::NonPositive {
                field: "ref_unit_px",
                ..
            })
        ));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{"step_x_mm": 18, "diode": {"name": "D", "pattern": "D{}", "enabled": false}}"#)
                .unwrap();
        assert_eq!(s.step_x_mm, 18.0);
        assert_eq!(s.step_y_mm, 19.05);
        assert!(!s.diode.enabled);
        assert_eq!(s.switch.pattern, "SW{}");
    }
}
