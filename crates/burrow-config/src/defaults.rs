/// Default log filter expression used by the host binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable consulted for the client configuration path.
pub const CONFIG_PATH_ENV: &str = "BURROW_CONFIG_PATH";

/// Environment variable consulted for the device name.
pub const DEVICE_NAME_ENV: &str = "BURROW_DEVICE_NAME";

/// Environment variable consulted for the optional state file path.
pub const STATE_PATH_ENV: &str = "BURROW_STATE_PATH";

/// Environment variable consulted for the log filter expression.
pub const LOG_FILTER_ENV: &str = "BURROW_LOG_FILTER";

/// Environment variable consulted for the log output format.
pub const LOG_FORMAT_ENV: &str = "BURROW_LOG_FORMAT";

/// Default logging format for the host binary.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}
