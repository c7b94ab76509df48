//! Serialisable snapshot of one client.

use serde::Serialize;

use crate::controller::ClientState;
use crate::errors::ErrorRecord;
use crate::registry::ClientHandle;

/// Point-in-time view of a client, suitable for handing to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientStatus {
    handle: ClientHandle,
    state: ClientState,
    device_name: String,
    last_error: Option<ErrorRecord>,
}

impl ClientStatus {
    /// Builds a snapshot.
    #[must_use]
    pub fn new(
        handle: ClientHandle,
        state: ClientState,
        device_name: impl Into<String>,
        last_error: Option<ErrorRecord>,
    ) -> Self {
        Self {
            handle,
            state,
            device_name: device_name.into(),
            last_error,
        }
    }

    /// Handle the snapshot describes.
    #[must_use]
    pub const fn handle(&self) -> ClientHandle {
        self.handle
    }

    /// State at the time of the snapshot.
    #[must_use]
    pub const fn state(&self) -> ClientState {
        self.state
    }

    /// Device name the client was configured with.
    #[must_use]
    pub fn device_name(&self) -> &str {
        self.device_name.as_str()
    }

    /// Failure recorded by the most recent run, if any.
    #[must_use]
    pub const fn last_error(&self) -> Option<&ErrorRecord> {
        self.last_error.as_ref()
    }
}
