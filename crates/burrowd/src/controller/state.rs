use std::fmt;

use serde::Serialize;

/// Lifecycle state of one embedded client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientState {
    /// No client exists for the handle.
    Uninitialized,
    /// The agent is allocated but has not been started.
    Initialized,
    /// The agent is started and `run` is blocked on it.
    Running,
    /// Termination was requested and the agent has not yet confirmed exit.
    Stopping,
    /// The agent exited cleanly, or was never started before a stop.
    Stopped,
    /// The agent failed while running.
    Failed,
}

impl ClientState {
    /// Stable text form used in logs and status snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` once the client can no longer change state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
