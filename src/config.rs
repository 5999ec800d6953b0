//! Layered configuration.
//!
//! Settings are merged from, lowest to highest priority:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config PATH`, or `config.toml` in the platform config
//!    directory when it exists
//! 3. `DUPESCAN_*` environment variables (`DUPESCAN_MIN_SIZE=4096`)
//!
//! Command-line flags are applied on top by the application layer.
//!
//! # Example
//!
//! ```toml
//! recursive = true
//! min_size = 1024
//! skip_hidden = false
//! io_threads = 8
//! trash = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::{DeleteConfig, DeleteMode};
use crate::scanner::WalkerConfig;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors from loading or rendering the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A provider failed to parse or a value has the wrong type.
    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A value parsed but is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Rendering the configuration as TOML failed.
    #[error("Failed to render configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Effective scan and deletion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Smallest file size, in bytes, that takes part in a scan.
    pub min_size: u64,
    /// Skip entries whose name starts with a dot.
    pub skip_hidden: bool,
    /// Worker threads for the hashing phase.
    pub io_threads: usize,
    /// Move deleted files to the system trash instead of removing them.
    pub trash: bool,
}

impl Default for Config {
    fn default() -> Self {
        let walker = WalkerConfig::default();
        Self {
            recursive: walker.recursive,
            min_size: walker.min_size,
            skip_hidden: walker.skip_hidden,
            io_threads: 4,
            trash: false,
        }
    }
}

impl Config {
    /// The platform-specific default config file location.
    ///
    /// `~/.config/dupescan/config.toml` on Linux.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupescan", "dupescan")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Build the provider stack without extracting it.
    ///
    /// `path` replaces the default file location. A missing default file is
    /// ignored.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Some(default) = Self::default_path() {
                    figment = figment.merge(Toml::file(default));
                }
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `path` is given but missing,
    /// and [`ConfigError::Figment`] or [`ConfigError::Invalid`] for bad
    /// values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }

        let config: Config = Self::figment(path).extract()?;
        config.validate()?;

        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.io_threads == 0 {
            return Err(ConfigError::Invalid(
                "io_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Render as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if rendering fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_recursive(self.recursive)
            .with_skip_hidden(self.skip_hidden)
            .with_min_size(self.min_size)
    }

    /// Deletion settings derived from this configuration.
    #[must_use]
    pub fn delete_config(&self) -> DeleteConfig {
        let mode = if self.trash {
            DeleteMode::Trash
        } else {
            DeleteMode::Permanent
        };
        DeleteConfig::default().with_mode(mode)
    }
}
