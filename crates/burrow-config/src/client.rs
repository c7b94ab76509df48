//! Immutable configuration handed to the client at initialisation.
//!
//! The controller treats the configuration file as opaque: it only checks that
//! the values are structurally usable. Reading and interpreting the file is
//! the network agent's job once it starts.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use thiserror::Error;

/// Errors raised when a configuration is not structurally usable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file path was empty or blank.
    #[error("configuration path must not be empty")]
    EmptyConfigPath,
    /// The device name was empty or blank.
    #[error("device name must not be empty")]
    EmptyDeviceName,
    /// A state file path was supplied but was blank.
    #[error("state path must not be empty when provided")]
    EmptyStatePath,
}

/// Configuration for one embedded client.
///
/// Values are validated once by [`ClientConfig::new`] and never change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    config_path: Utf8PathBuf,
    device_name: String,
    state_path: Option<Utf8PathBuf>,
}

impl ClientConfig {
    /// Validates and builds a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyConfigPath`] or
    /// [`ConfigError::EmptyDeviceName`] when either value is blank.
    pub fn new(
        config_path: impl Into<Utf8PathBuf>,
        device_name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let path: Utf8PathBuf = config_path.into();
        let device: String = device_name.into();
        if path.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyConfigPath);
        }
        if device.trim().is_empty() {
            return Err(ConfigError::EmptyDeviceName);
        }
        Ok(Self {
            config_path: path,
            device_name: device,
            state_path: None,
        })
    }

    /// Attaches the path of the agent's persisted state file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyStatePath`] when the path is blank.
    pub fn with_state_path(mut self, path: impl Into<Utf8PathBuf>) -> Result<Self, ConfigError> {
        let state_path: Utf8PathBuf = path.into();
        if state_path.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyStatePath);
        }
        self.state_path = Some(state_path);
        Ok(self)
    }

    /// Path of the configuration file the agent reads on start.
    #[must_use]
    pub fn config_path(&self) -> &Utf8Path {
        self.config_path.as_path()
    }

    /// Name this device announces to its peers.
    #[must_use]
    pub fn device_name(&self) -> &str {
        self.device_name.as_str()
    }

    /// Path of the agent's persisted state file, when configured.
    #[must_use]
    pub fn state_path(&self) -> Option<&Utf8Path> {
        self.state_path.as_deref()
    }
}
