//! Caller-visible error taxonomy for client lifecycle operations.
//!
//! Every error crossing the embedding boundary carries a stable
//! [`ErrorKind`] plus a human-readable message. [`ErrorRecord`] is the flat,
//! serialisable form the boundary adapter converts into the host's native
//! error representation.

use std::fmt;

use burrow_config::ConfigError;
use serde::Serialize;
use thiserror::Error;

use crate::agent::{AgentBuildError, AgentFault};
use crate::controller::ClientState;

/// Stable classification of lifecycle errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Configuration was malformed or missing at init time.
    ConfigError,
    /// The agent could not be built from a valid-looking configuration.
    AgentConstructionError,
    /// The operation is not permitted in the client's current state.
    InvalidStateError,
    /// The agent failed after it started running.
    RuntimeError,
}

impl ErrorKind {
    /// Stable text form of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigError => "config_error",
            Self::AgentConstructionError => "agent_construction_error",
            Self::InvalidStateError => "invalid_state_error",
            Self::RuntimeError => "runtime_error",
        }
    }

    /// Returns `true` when retrying the same call cannot succeed without the
    /// caller changing something first.
    #[must_use]
    pub const fn is_caller_fault(self) -> bool {
        matches!(self, Self::ConfigError | Self::InvalidStateError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Rejections for operations requested from a state that forbids them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    /// `run` was called while the client is already running.
    #[error("client is already running")]
    AlreadyRunning,
    /// `run` was called from a state other than `initialized`.
    #[error("cannot run a client that is {state}")]
    NotRunnable {
        /// State the client was in when the call arrived.
        state: ClientState,
    },
}

impl InvalidStateError {
    /// Builds the rejection for a `run` call arriving in `state`.
    #[must_use]
    pub const fn for_run(state: ClientState) -> Self {
        match state {
            ClientState::Running => Self::AlreadyRunning,
            other => Self::NotRunnable { state: other },
        }
    }
}

/// Errors returned by the client lifecycle operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configuration is not structurally usable.
    #[error("invalid configuration: {source}")]
    Config {
        /// Validation failure.
        #[from]
        source: ConfigError,
    },
    /// The network agent could not be constructed.
    #[error("failed to construct network agent: {source}")]
    AgentConstruction {
        /// Failure reported by the agent factory.
        #[from]
        source: AgentBuildError,
    },
    /// The operation is not valid in the current state.
    #[error("invalid client state: {source}")]
    InvalidState {
        /// Rejection detail.
        #[from]
        source: InvalidStateError,
    },
    /// The agent failed while running.
    #[error("network agent failed: {source}")]
    Runtime {
        /// Failure reported by the agent.
        #[from]
        source: AgentFault,
    },
}

impl ClientError {
    /// Stable kind used by the boundary adapter to classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::ConfigError,
            Self::AgentConstruction { .. } => ErrorKind::AgentConstructionError,
            Self::InvalidState { .. } => ErrorKind::InvalidStateError,
            Self::Runtime { .. } => ErrorKind::RuntimeError,
        }
    }

    /// Flattens the error into its boundary representation.
    #[must_use]
    pub fn record(&self) -> ErrorRecord {
        ErrorRecord::new(self.kind(), self.to_string())
    }

    /// Returns the invalid-state detail when this is a state rejection.
    #[must_use]
    pub const fn invalid_state(&self) -> Option<InvalidStateError> {
        match self {
            Self::InvalidState { source } => Some(*source),
            _ => None,
        }
    }
}

/// Flat `{kind, message}` pair surfaced across the embedding boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    kind: ErrorKind,
    message: String,
}

impl ErrorRecord {
    /// Builds a record from its parts.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Stable classification of the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl From<&ClientError> for ErrorRecord {
    fn from(error: &ClientError) -> Self {
        error.record()
    }
}
