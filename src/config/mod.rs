// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::watermark::WatermarkConfig;

pub mod defaults;

/// Errors raised while loading the engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

fn default_adaptive_area_ratio() -> f64 {
    defaults::ADAPTIVE_AREA_RATIO
}

fn default_proportional_area_ratio() -> f64 {
    defaults::PROPORTIONAL_AREA_RATIO
}

fn default_proportion_tolerance() -> f64 {
    defaults::PROPORTION_TOLERANCE
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

/// Batch strategy thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Area ratio above which each image scales independently (default: 10)
    #[serde(default = "default_adaptive_area_ratio")]
    pub adaptive_area_ratio: f64,

    /// Area ratio above which shared proportions are used (default: 3)
    #[serde(default = "default_proportional_area_ratio")]
    pub proportional_area_ratio: f64,

    /// Max scale difference for proportions to count as equal (default: 0.01)
    #[serde(default = "default_proportion_tolerance")]
    pub proportion_tolerance: f64,

    /// Plan batch images on the rayon thread pool (default: true)
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            adaptive_area_ratio: default_adaptive_area_ratio(),
            proportional_area_ratio: default_proportional_area_ratio(),
            proportion_tolerance: default_proportion_tolerance(),
            parallel: true,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event, for log aggregation
    #[default]
    Json,
    /// Human readable, for local development
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (default: info)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Preset grouping
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresetCategory {
    Text,
    Image,
    Fullscreen,
    #[default]
    Custom,
}

/// A named, reusable watermark configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: PresetCategory,
    pub watermark: WatermarkConfig,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Replace `${VAR_NAME}` with environment variable values.
///
/// Every referenced variable must be set; the first missing one is reported.
fn substitute_env_vars(text: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

    // First, check that all referenced environment variables exist
    for caps in re.captures_iter(text) {
        let var_name = &caps[1];
        if std::env::var(var_name).is_err() {
            return Err(ConfigError::MissingEnvVar(var_name.to_string()));
        }
    }

    let substituted = re.replace_all(text, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    });
    Ok(substituted.into_owned())
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        let substituted = substitute_env_vars(yaml)?;
        let config: Config = serde_yaml::from_str(&substituted)?;
        Ok(config)
    }

    /// Same as [`Config::from_yaml_with_env`] for JSON documents, such as
    /// presets exported from another tool.
    pub fn from_json_with_env(json: &str) -> Result<Self, ConfigError> {
        let substituted = substitute_env_vars(json)?;
        let config: Config = serde_json::from_str(&substituted)?;
        Ok(config)
    }

    /// Load, substitute and validate a config file.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_with_env(&text)?
        } else {
            Self::from_yaml_with_env(&text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let batch = &self.batch;
        if !(batch.proportional_area_ratio >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "batch.proportional_area_ratio must be >= 1, got {}",
                batch.proportional_area_ratio
            )));
        }
        if !(batch.adaptive_area_ratio >= batch.proportional_area_ratio) {
            return Err(ConfigError::Invalid(format!(
                "batch.adaptive_area_ratio ({}) must be >= batch.proportional_area_ratio ({})",
                batch.adaptive_area_ratio, batch.proportional_area_ratio
            )));
        }
        if !(batch.proportion_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "batch.proportion_tolerance must be >= 0, got {}",
                batch.proportion_tolerance
            )));
        }

        let mut seen_ids = HashSet::new();
        let mut default_count = 0;

        for preset in &self.presets {
            if preset.id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "Preset id cannot be empty".to_string(),
                ));
            }

            if !seen_ids.insert(preset.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate preset id '{}'",
                    preset.id
                )));
            }

            if preset.is_default {
                default_count += 1;
            }

            preset.watermark.validate().map_err(|e| {
                ConfigError::Invalid(format!("Preset '{}': {}", preset.id, e))
            })?;
        }

        if default_count > 1 {
            return Err(ConfigError::Invalid(format!(
                "Only one preset may be the default, found {}",
                default_count
            )));
        }

        Ok(())
    }

    pub fn preset(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// The preset marked `is_default`, or the first preset.
    pub fn default_preset(&self) -> Option<&Preset> {
        self.presets
            .iter()
            .find(|p| p.is_default)
            .or_else(|| self.presets.first())
    }
}
