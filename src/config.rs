use crate::constants::{DEFAULT_DATA_TIMEOUT_SECS, SERVER_NAME_MAX_LENGTH, USERNAME_REGEX};
use crate::users::UserStore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host name or address the control listener and passive listeners bind to.
    pub server_name: String,
    pub port: u16,
    /// Directory every user jail is resolved against.
    pub root: PathBuf,
    pub access_log: Option<PathBuf>,
    pub error_log: Option<PathBuf>,
    pub data_timeout_secs: Option<u64>, // Optional to allow default value
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(rename = "user", default)]
    pub users: UserStore,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: String::from("localhost"),
            port: 21,
            root: PathBuf::from("/srv/ftp"),
            access_log: None,
            error_log: None,
            data_timeout_secs: Some(DEFAULT_DATA_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Reads, parses and validates a configuration file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(contents)?;

        // Set defaults if not specified
        if config.server.data_timeout_secs.is_none() {
            config.server.data_timeout_secs = Some(DEFAULT_DATA_TIMEOUT_SECS);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.server.server_name.trim();
        if name.is_empty() || name.len() > SERVER_NAME_MAX_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "server_name must be 1 to {} characters",
                SERVER_NAME_MAX_LENGTH
            )));
        }

        if !self.server.root.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "root {} is not a directory",
                self.server.root.display()
            )));
        }

        if self.server.data_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "data_timeout_secs must be greater than zero".into(),
            ));
        }

        if self.users.is_empty() {
            return Err(ConfigError::Invalid("at least one [[user]] is required".into()));
        }

        let username_re = Regex::new(USERNAME_REGEX)
            .map_err(|e| ConfigError::Invalid(format!("username pattern: {}", e)))?;
        let mut seen = HashSet::new();
        for user in self.users.iter() {
            if !username_re.is_match(&user.username) {
                return Err(ConfigError::Invalid(format!(
                    "invalid username {:?}",
                    user.username
                )));
            }
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate username {:?}",
                    user.username
                )));
            }
        }

        Ok(())
    }

    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(
            self.server
                .data_timeout_secs
                .unwrap_or(DEFAULT_DATA_TIMEOUT_SECS),
        )
    }
}
