//! Shared configuration types for the Burrow client controller.
//!
//! The crate holds the immutable [`ClientConfig`] handed to each embedded
//! client, the logging defaults, and the [`HostArgs`] surface used by the
//! `burrowd` host binary.

mod client;
mod defaults;
mod host;
mod logging;

pub use client::{ClientConfig, ConfigError};
pub use defaults::{
    CONFIG_PATH_ENV, DEFAULT_LOG_FILTER, DEVICE_NAME_ENV, LOG_FILTER_ENV, LOG_FORMAT_ENV,
    STATE_PATH_ENV, default_log_format,
};
pub use host::HostArgs;
pub use logging::LogFormat;
