//! Configuration loading and parsing for Polyscan.
//!
//! Provides functionality to load and parse `polyscan.toml` configuration
//! files and to bridge them into runner options.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::issue::{Category, Severity};
use crate::runner::RunOptions;

pub const CONFIG_FILENAME: &str = "polyscan.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["analyzers"];
const KNOWN_ANALYZERS_KEYS: &[&str] = &[
    "disabled",
    "severity",
    "quality",
    "security",
    "duplication",
    "max_issues",
    "halt_on_error",
    "track_timing",
    "config",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Free-form key/value configuration for one analyzer, with typed getters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyzerConfig(BTreeMap<String, serde_json::Value>);

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(|v| v.as_f64())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.0
            .get(key)
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(|v| v.as_bool())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub analyzers: AnalyzersConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzersConfig {
    pub disabled: Vec<String>,
    #[serde(default)]
    pub severity: HashMap<String, SeverityValue>,
    pub quality: Option<bool>,
    pub security: Option<bool>,
    pub duplication: Option<bool>,
    pub max_issues: Option<usize>,
    pub halt_on_error: Option<bool>,
    pub track_timing: Option<bool>,
    #[serde(default)]
    pub config: HashMap<String, AnalyzerConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityValue {
    Error,
    Warning,
    Info,
    Hint,
}

impl From<SeverityValue> for Severity {
    fn from(value: SeverityValue) -> Self {
        match value {
            SeverityValue::Error => Severity::Error,
            SeverityValue::Warning => Severity::Warning,
            SeverityValue::Info => Severity::Info,
            SeverityValue::Hint => Severity::Hint,
        }
    }
}

impl Config {
    /// Translate file configuration into runner options.
    pub fn to_run_options(&self) -> RunOptions {
        let mut disabled_categories = HashSet::new();
        if self.analyzers.quality == Some(false) {
            disabled_categories.insert(Category::Quality);
        }
        if self.analyzers.security == Some(false) {
            disabled_categories.insert(Category::Security);
        }
        if self.analyzers.duplication == Some(false) {
            disabled_categories.insert(Category::Duplication);
        }

        RunOptions {
            analyzers: None,
            config: self.analyzers.config.clone(),
            max_issues: self.analyzers.max_issues,
            halt_on_error: self.analyzers.halt_on_error.unwrap_or(false),
            track_timing: self.analyzers.track_timing.unwrap_or(false),
            disabled: self.analyzers.disabled.clone(),
            severity_overrides: self
                .analyzers
                .severity
                .iter()
                .map(|(id, value)| (id.clone(), (*value).into()))
                .collect(),
            disabled_categories,
        }
    }
}

/// Walk upward from `start_dir` looking for a `polyscan.toml`.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

/// Load a config and report unknown keys as warnings instead of failing.
pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    let mut warnings = Vec::new();
    if let Ok(value) = content.parse::<toml::Value>() {
        if let Some(table) = value.as_table() {
            for key in table.keys() {
                if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
                    warnings.push(format!("Unknown configuration key '{key}'"));
                }
            }
            if let Some(analyzers) = table.get("analyzers").and_then(|v| v.as_table()) {
                for key in analyzers.keys() {
                    if !KNOWN_ANALYZERS_KEYS.contains(&key.as_str()) {
                        warnings.push(format!("Unknown configuration key 'analyzers.{key}'"));
                    }
                }
            }
        }
    }

    Ok(ConfigResult { config, warnings })
}
