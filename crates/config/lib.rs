use log::info;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config file {0}: {1}")]
    Io(String, std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    Yaml(String, serde_yaml::Error),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source: String,
    pub columns: Columns,
    pub window: Window,
    pub top_n: usize,
}

/// CSV header names for every field a record is built from.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Columns {
    pub id: String,
    pub date: String,
    pub season: String,
    pub holiday: String,
    pub weekday: String,
    pub total: String,
    pub secondary_total: String,
    pub casual: String,
    pub registered: String,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Window {
    pub policy: Policy,
    pub since: Option<String>,
    pub until: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    #[default]
    Clamp,
    Reject,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: "main_data.csv".to_string(),
            columns: Columns::default(),
            window: Window::default(),
            top_n: 5,
        }
    }
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            id: "instant".to_string(),
            date: "dteday_x".to_string(),
            season: "season_x".to_string(),
            holiday: "holiday_x".to_string(),
            weekday: "weekday_x".to_string(),
            total: "cnt_x".to_string(),
            secondary_total: "cnt_y".to_string(),
            casual: "casual_y".to_string(),
            registered: "registered_y".to_string(),
        }
    }
}

impl Config {
    /// Reads `filename`, falling back to the defaults when the file does not exist.
    pub fn new(filename: &str) -> Result<Config, ConfigError> {
        if !Path::new(filename).exists() {
            info!("config file {} not found, using defaults", filename);
            return Ok(Config::default());
        }
        let reader = File::open(filename).map_err(|e| ConfigError::Io(filename.to_string(), e))?;
        let config: Config = serde_yaml::from_reader(reader)
            .map_err(|e| ConfigError::Yaml(filename.to_string(), e))?;
        info!("config loaded from {}", filename);
        Ok(config)
    }
}
