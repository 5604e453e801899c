//! Configuration loading and validation.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub storages: Vec<Storage>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Storage {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Only meaningful after [`Config::validate`] has accepted the format.
    pub fn log_format(&self) -> LogFormat {
        match self.format.as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Which RPC services get mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_service_enabled")]
    pub operations: bool,
    #[serde(default = "default_service_enabled")]
    pub refs: bool,
    #[serde(default = "default_service_enabled")]
    pub commits: bool,
}

impl ServicesConfig {
    pub const fn any_enabled(&self) -> bool {
        self.operations || self.refs || self.commits
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            operations: default_service_enabled(),
            refs: default_service_enabled(),
            commits: default_service_enabled(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid toml: {0}")]
    InvalidToml(#[from] toml::de::Error),
    #[error("at least one storage must be configured")]
    EmptyStorages,
    #[error("storage name must not be empty")]
    EmptyStorageName,
    #[error("duplicate storage name `{0}`")]
    DuplicateStorageName(String),
    #[error("storage `{name}` path must be absolute: `{path}`")]
    RelativeStoragePath { name: String, path: String },
    #[error("logging level must not be empty")]
    EmptyLogLevel,
    #[error("unknown logging format `{0}`, expected `text` or `json`")]
    UnknownLogFormat(String),
    #[error("at least one service must be enabled")]
    NoServicesEnabled,
}

impl Config {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storages.is_empty() {
            return Err(ConfigError::EmptyStorages);
        }

        let mut names = HashSet::new();

        for storage in &self.storages {
            if storage.name.trim().is_empty() {
                return Err(ConfigError::EmptyStorageName);
            }

            if !names.insert(storage.name.as_str()) {
                return Err(ConfigError::DuplicateStorageName(storage.name.clone()));
            }

            if !storage.path.starts_with('/') {
                return Err(ConfigError::RelativeStoragePath {
                    name: storage.name.clone(),
                    path: storage.path.clone(),
                });
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::EmptyLogLevel);
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::UnknownLogFormat(self.logging.format.clone()));
        }

        if !self.services.any_enabled() {
            return Err(ConfigError::NoServicesEnabled);
        }

        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

const fn default_service_enabled() -> bool {
    true
}
