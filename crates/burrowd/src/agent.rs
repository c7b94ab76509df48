//! Contract between the lifecycle controller and the network agent it drives.
//!
//! The agent is the networking engine proper (peer discovery, signalling,
//! tunnel transport). The controller never looks inside it; it only needs the
//! three capabilities expressed by [`NetworkAgent`], plus an [`AgentFactory`]
//! able to build one agent per client from a validated configuration.

use std::fmt;

use burrow_config::ClientConfig;
use thiserror::Error;

/// Boxed error reported by agent implementations.
pub type AgentErrorSource = Box<dyn std::error::Error + Send + Sync>;

/// Capabilities the controller requires from a network agent.
///
/// Implementations must tolerate `stop` arriving at any point after the agent
/// was built, including after it has already exited, and must make
/// [`NetworkAgent::wait_for_exit`] return once `stop` has been requested.
pub trait NetworkAgent: Send + Sync {
    /// Starts the agent without blocking for its whole lifetime.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentFault`] when the agent cannot come up, for example
    /// because the configuration file it reads is unusable.
    fn start(&self) -> Result<(), AgentFault>;

    /// Requests termination. Must not block on the agent's teardown.
    fn stop(&self);

    /// Blocks until the agent has exited and reports why.
    fn wait_for_exit(&self) -> AgentExit;
}

/// Builds agents bound to a client configuration.
pub trait AgentFactory: Send + Sync {
    /// Agent type produced by this factory.
    type Agent: NetworkAgent + 'static;

    /// Allocates an agent for `config` without starting it.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentBuildError`] when resources for the agent cannot be
    /// acquired.
    fn build(&self, config: &ClientConfig) -> Result<Self::Agent, AgentBuildError>;
}

/// Outcome reported by [`NetworkAgent::wait_for_exit`].
#[derive(Debug)]
pub enum AgentExit {
    /// The agent shut down without error.
    Clean,
    /// The agent terminated because of an internal failure.
    Faulted(AgentFault),
}

impl AgentExit {
    /// Returns `true` when the agent exited without a fault.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// Failure reported by a started agent.
#[derive(Debug, Error)]
#[error("{detail}")]
pub struct AgentFault {
    detail: String,
    #[source]
    source: Option<AgentErrorSource>,
}

impl AgentFault {
    /// Builds a fault carrying only a description.
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            source: None,
        }
    }

    /// Builds a fault that wraps the underlying error.
    #[must_use]
    pub fn with_source(detail: impl Into<String>, source: impl Into<AgentErrorSource>) -> Self {
        Self {
            detail: detail.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.detail.as_str()
    }
}

/// Error raised when an agent cannot be allocated.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AgentBuildError {
    message: String,
    #[source]
    source: Option<AgentErrorSource>,
}

impl AgentBuildError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<AgentErrorSource>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for AgentExit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => formatter.write_str("clean exit"),
            Self::Faulted(fault) => write!(formatter, "faulted: {fault}"),
        }
    }
}
