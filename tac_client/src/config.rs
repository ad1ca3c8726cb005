//! Client configuration.
//!
//! Loaded from `client_config.json` with environment variable overrides; a
//! builtin document keeps the client usable with no file on disk.

use std::{env, fs, io, net::SocketAddr, path::Path};

use serde::Deserialize;
use thiserror::Error;

use tac_schema::Coalition;

pub const BUILTIN_CLIENT_CONFIG: &str = include_str!("data/client_config.json");

/// Root configuration for the map client core.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Address the update stream is served on.
    pub update_addr: SocketAddr,
    /// Address the command channel listens on.
    pub command_addr: SocketAddr,
    /// Side the local player commands; detection edges are derived from
    /// this side's contact reports.
    pub commanded_coalition: String,
    /// Coalitions hidden on startup (names as in [`Coalition::name`]).
    pub hidden_coalitions: Vec<String>,
    /// Categories hidden on startup (wire names).
    pub hidden_categories: Vec<String>,
    /// Disable to skip detection derivation entirely, e.g. for replay
    /// tooling that only needs positions.
    pub recompute_detection: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            update_addr: ([127, 0, 0, 1], 3001).into(),
            command_addr: ([127, 0, 0, 1], 3002).into(),
            commanded_coalition: "blue".to_owned(),
            hidden_coalitions: Vec::new(),
            hidden_categories: Vec::new(),
            recompute_detection: true,
        }
    }
}

/// Error loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ClientConfig {
    /// The compiled-in default document.
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_CLIENT_CONFIG).expect("builtin client config parses")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` if given, falling back to the builtin document on
    /// any failure. Failures are logged, not fatal: a map client with a bad
    /// config file should still come up.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let mut config = match path {
            Some(path) => Self::load(path).unwrap_or_else(|err| {
                log::warn!(
                    "falling back to builtin config, could not load {}: {}",
                    path.display(),
                    err
                );
                Self::builtin()
            }),
            None => Self::builtin(),
        };
        config.apply_env_overrides();
        config
    }

    /// `TACMAP_UPDATE_ADDR`, `TACMAP_COMMAND_ADDR` and `TACMAP_COALITION`
    /// override the file values, matching how the server picks its ports.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("TACMAP_UPDATE_ADDR") {
            match value.parse() {
                Ok(addr) => self.update_addr = addr,
                Err(err) => log::warn!("ignoring TACMAP_UPDATE_ADDR {:?}: {}", value, err),
            }
        }
        if let Ok(value) = env::var("TACMAP_COMMAND_ADDR") {
            match value.parse() {
                Ok(addr) => self.command_addr = addr,
                Err(err) => log::warn!("ignoring TACMAP_COMMAND_ADDR {:?}: {}", value, err),
            }
        }
        if let Ok(value) = env::var("TACMAP_COALITION") {
            if Coalition::from_name(&value).is_some() {
                self.commanded_coalition = value;
            } else {
                log::warn!("ignoring TACMAP_COALITION {:?}: unknown coalition", value);
            }
        }
    }

    /// Resolve the commanded coalition, defaulting to neutral when the
    /// configured name is unknown.
    pub fn commanded(&self) -> Coalition {
        Coalition::from_name(&self.commanded_coalition).unwrap_or_else(|| {
            log::warn!(
                "unknown commanded_coalition {:?}, defaulting to neutral",
                self.commanded_coalition
            );
            Coalition::Neutral
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_parses() {
        let config = ClientConfig::builtin();
        assert_eq!(config.commanded(), Coalition::Blue);
        assert!(config.recompute_detection);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "commanded_coalition": "red" }"#).unwrap();
        assert_eq!(config.commanded(), Coalition::Red);
        assert_eq!(config.update_addr, ([127, 0, 0, 1], 3001).into());
        assert!(config.hidden_categories.is_empty());
    }

    #[test]
    fn unknown_coalition_falls_back_to_neutral() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "commanded_coalition": "purple" }"#).unwrap();
        assert_eq!(config.commanded(), Coalition::Neutral);
    }
}
