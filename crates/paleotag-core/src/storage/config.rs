//! TOML-based application configuration.
//!
//! Stores labelling defaults:
//! - Resampling step and the time unit series are converted to
//! - Breakpoint scheme and amplitude style for new fits
//! - Default event type for archive entries
//! - Text display preferences
//!
//! Configuration is stored at `~/.config/paleotag/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::config_dir;
use crate::error::ConfigError;
use crate::series::TimeUnit;
use crate::shape::{AmplitudeMode, BreakpointScheme};

/// How raw series are prepared before fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResampleConfig {
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default = "default_time_unit")]
    pub time_unit: String,
    #[serde(default = "default_true")]
    pub standardize: bool,
}

/// Breakpoint layout for new fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_amplitude")]
    pub amplitude: String,
}

/// Archive entry defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_event_type")]
    pub default_event_type: String,
}

/// Text display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub reverse: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_precision")]
    pub precision: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/paleotag/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resample: ResampleConfig,
    #[serde(default)]
    pub fit: FitConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_step() -> f64 {
    1.0
}
fn default_time_unit() -> String {
    "yr BP".into()
}
fn default_true() -> bool {
    true
}
fn default_scheme() -> String {
    "spline".into()
}
fn default_amplitude() -> String {
    "series".into()
}
fn default_event_type() -> String {
    "heinrich".into()
}
fn default_width() -> u32 {
    60
}
fn default_precision() -> u32 {
    3
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            time_unit: default_time_unit(),
            standardize: true,
        }
    }
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            amplitude: default_amplitude(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            default_event_type: default_event_type(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            reverse: false,
            width: default_width(),
            precision: default_precision(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
                    ),
                    serde_json::Value::Number(n) => {
                        if n.is_f64() {
                            value
                                .parse::<f64>()
                                .ok()
                                .and_then(serde_json::Number::from_f64)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            value
                                .parse::<u64>()
                                .map(|n| serde_json::Value::Number(n.into()))
                                .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse or
    /// validate. On error the config is left unchanged.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Check that every field parses into its typed form.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.resample.step.is_finite() || self.resample.step <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "resample.step".into(),
                message: format!("{} must be finite and greater than zero", self.resample.step),
            });
        }
        self.time_unit()?;
        self.scheme()?;
        self.amplitude_mode()?;
        Ok(())
    }

    pub fn time_unit(&self) -> Result<TimeUnit, ConfigError> {
        TimeUnit::parse(&self.resample.time_unit).map_err(|e| ConfigError::InvalidValue {
            key: "resample.time_unit".into(),
            message: e.to_string(),
        })
    }

    pub fn scheme(&self) -> Result<BreakpointScheme, ConfigError> {
        self.fit.scheme.parse().map_err(|e: crate::error::ValidationError| {
            ConfigError::InvalidValue {
                key: "fit.scheme".into(),
                message: e.to_string(),
            }
        })
    }

    pub fn amplitude_mode(&self) -> Result<AmplitudeMode, ConfigError> {
        self.fit.amplitude.parse().map_err(|e: crate::error::ValidationError| {
            ConfigError::InvalidValue {
                key: "fit.amplitude".into(),
                message: e.to_string(),
            }
        })
    }
}
