//! Command-line and environment surface of the `burrowd` host binary.
//!
//! Flags take precedence over their environment fallbacks, which in turn take
//! precedence over the built-in defaults.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::Parser;

use crate::client::{ClientConfig, ConfigError};
use crate::defaults::{
    CONFIG_PATH_ENV, DEFAULT_LOG_FILTER, DEVICE_NAME_ENV, LOG_FILTER_ENV, LOG_FORMAT_ENV,
    STATE_PATH_ENV, default_log_format,
};
use crate::logging::LogFormat;

/// Settings accepted by the host binary.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "burrowd",
    version,
    about = "Runs one embedded network client until a termination signal arrives"
)]
pub struct HostArgs {
    /// Path of the client configuration file handed to the network agent.
    #[arg(long, env = CONFIG_PATH_ENV, default_value = "")]
    pub config_path: Utf8PathBuf,

    /// Device name announced to peers.
    #[arg(long, env = DEVICE_NAME_ENV, default_value = "")]
    pub device_name: String,

    /// Optional path of the agent's persisted state file.
    #[arg(long, env = STATE_PATH_ENV)]
    pub state_path: Option<Utf8PathBuf>,

    /// Tracing filter expression, for example `info` or `burrowd=debug`.
    #[arg(long, env = LOG_FILTER_ENV, default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log output format.
    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = default_log_format())]
    pub log_format: LogFormat,
}

impl HostArgs {
    /// Parses host settings from an explicit argument list.
    ///
    /// # Errors
    ///
    /// Returns the clap error describing invalid or unknown arguments.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Builds the validated client configuration described by these settings.
    ///
    /// Blank values are passed through so validation reports them with the
    /// same errors the embedding boundary would see.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the path or device name is blank.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let config = ClientConfig::new(self.config_path.clone(), self.device_name.clone())?;
        match &self.state_path {
            Some(path) => config.with_state_path(path.clone()),
            None => Ok(config),
        }
    }
}
