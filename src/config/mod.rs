use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Name of the config file looked up under the XDG config directories.
const CONFIG_FILE: &str = "config.yaml";

/// Represents all possible errors loading a [Config]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Bridge configuration options.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Force both triggers off on every known controller when the bridge
    /// shuts down.
    #[serde(default = "default_true")]
    pub reset_triggers_on_quit: bool,
    /// Log apply calls that target an out-of-range controller index.
    #[serde(default)]
    pub error_on_invalid_index: bool,
    /// Log every successfully applied effect.
    #[serde(default)]
    pub print_on_effect_apply: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reset_triggers_on_quit: true,
            error_on_invalid_index: false,
            print_on_effect_apply: false,
        }
    }
}

impl Config {
    /// Load a [Config] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<Config, LoadError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [Config] from the given YAML file
    pub fn from_yaml_file(path: String) -> Result<Config, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Load the configuration from the given path, or fall back to the XDG
    /// config lookup. Returns the defaults when no config file exists.
    pub fn load(path: Option<String>) -> Result<Config, LoadError> {
        if let Some(path) = path {
            return Config::from_yaml_file(path);
        }

        let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("triggerbridge") else {
            return Ok(Config::default());
        };
        match base_dirs.find_config_file(CONFIG_FILE) {
            Some(path) => {
                log::debug!("Loading config from {path:?}");
                Config::from_yaml_file(path.to_string_lossy().to_string())
            }
            None => Ok(Config::default()),
        }
    }
}
