use crate::model::UserPolicy;
use crate::store::{PostgresConfig, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Store setup failed: {0}")]
    Store(#[from] StoreError),
}

/// When Interim-Update and Stop notify the usage queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageNotify {
    /// Inside the transaction, before commit. A failed commit leaves an
    /// already-delivered record behind (at-least-once).
    #[default]
    BeforeCommit,
    /// Only once the transaction has committed
    AfterCommit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Required when `backend` is `postgres`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared secret used for PAP, CHAP and response signing
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Per-request detail logging
    #[serde(default)]
    pub verbose: bool,

    /// Log level: "trace", "debug", "info", "warn", "error" (default: "info")
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub usage_notify: UsageNotify,

    #[serde(default)]
    pub store: StoreConfig,

    /// Policy seeds for the memory store
    #[serde(default)]
    pub users: Vec<UserPolicy>,
}

fn default_secret() -> String {
    "testing123".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            secret: default_secret(),
            verbose: false,
            log_level: None,
            usage_notify: UsageNotify::default(),
            store: StoreConfig::default(),
            users: vec![],
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Invalid("Secret cannot be empty".to_string()));
        }

        if let Some(level) = &self.log_level {
            if !matches!(
                level.to_ascii_lowercase().as_str(),
                "trace" | "debug" | "info" | "warn" | "error"
            ) {
                return Err(ConfigError::Invalid(format!("Unknown log level: {}", level)));
            }
        }

        if self.store.backend == StoreBackend::Postgres && self.store.postgres.is_none() {
            return Err(ConfigError::Invalid(
                "store.postgres is required for the postgres backend".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if user.username.is_empty() {
                return Err(ConfigError::Invalid("User has empty username".to_string()));
            }
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate user: {}",
                    user.username
                )));
            }
            user.to_limits()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        Ok(())
    }

    /// Create an example configuration file
    pub fn example() -> Self {
        let mut limited = UserPolicy::new("bob", "secret");
        limited.simultaneous_use = 2;
        limited.ratelimit = Some("10M/20M".to_string());
        limited.dns_one = Some("8.8.8.8".to_string());
        limited.dns_two = Some("8.8.4.4".to_string());

        let mut fixed = UserPolicy::new("alice", "password1");
        fixed.dedicated_ip = Some("10.0.0.100".to_string());

        Config {
            secret: "testing123".to_string(),
            verbose: false,
            log_level: Some("info".to_string()),
            usage_notify: UsageNotify::BeforeCommit,
            store: StoreConfig::default(),
            users: vec![limited, fixed],
        }
    }
}

/// Per-engine settings taken from [`Config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    pub verbose: bool,
    pub usage_notify: UsageNotify,
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        EngineOptions {
            verbose: config.verbose,
            usage_notify: config.usage_notify,
        }
    }
}
