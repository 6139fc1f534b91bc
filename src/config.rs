use std::{path::Path, str::FromStr};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Application configuration
///
/// Loaded from a JSON file, or from YAML when the file ends with `.yaml`/`.yml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// sea-orm connection url, e.g. `sqlite://groupoverview.db?mode=rwc`
    pub database_url: String,
    /// `error`, `warn`, `info`, `debug` or `trace`
    #[serde(default)]
    pub log_level: Option<String>,
    /// Blank category slots offered when a new overview is created
    #[serde(default = "default_new_category_slots")]
    pub new_category_slots: usize,
    /// Blank category slots offered after the existing ones when editing
    #[serde(default = "default_extra_category_slots")]
    pub extra_category_slots: usize,
    /// Whether exports carry the group mappings
    #[serde(default = "default_backup_groups")]
    pub backup_groups: bool,
}

fn default_new_category_slots() -> usize { 4 }
fn default_extra_category_slots() -> usize { 2 }
fn default_backup_groups() -> bool { true }

impl Config {
    pub fn new<S: Into<String>>(database_url: S) -> Self {
        Self {
            database_url: database_url.into(),
            log_level: None,
            new_category_slots: default_new_category_slots(),
            extra_category_slots: default_extra_category_slots(),
            backup_groups: default_backup_groups(),
        }
    }
    pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self, String> {
        let filepath = filepath.as_ref();
        let str_config = match std::fs::read_to_string(filepath) {
            Ok(v) => v,
            Err(e) => return Err(format!("Unable to read file {}: {}", filepath.to_string_lossy(), e)),
        };
        let is_yaml = matches!(
            filepath.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let parsed = if is_yaml {
            Self::from_yaml(&str_config)
        } else {
            Self::from_json(&str_config)
        };
        parsed.map_err(|e| format!("Unable to parse {}: {}", filepath.to_string_lossy(), e))
    }
    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }
    /// Log level from the configuration, `None` when unset
    pub fn log_level(&self) -> Result<Option<LevelFilter>, String> {
        match &self.log_level {
            None => Ok(None),
            Some(level) => LevelFilter::from_str(level)
                .map(Some)
                .map_err(|_| format!("Unknown log level: {}", level)),
        }
    }
}
