//! Test double for [`LifecycleReporter`] that records events for assertions.

use std::sync::Mutex;

use burrow_config::ClientConfig;

use crate::errors::{ClientError, ErrorKind};
use crate::registry::ClientHandle;
use crate::reporter::LifecycleReporter;

/// Lifecycle events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    InitSucceeded(ClientHandle),
    InitFailed(ErrorKind),
    RunStarting(ClientHandle),
    AgentRunning(ClientHandle),
    StopRequested(ClientHandle),
    ClientStopped(ClientHandle),
    ClientFailed(ClientHandle, ErrorKind),
}

/// Records lifecycle events for assertions.
#[derive(Debug, Default)]
pub struct RecordingLifecycleReporter {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingLifecycleReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .push(event);
    }
}

impl LifecycleReporter for RecordingLifecycleReporter {
    fn init_succeeded(&self, handle: ClientHandle, _config: &ClientConfig) {
        self.record(LifecycleEvent::InitSucceeded(handle));
    }

    fn init_failed(&self, error: &ClientError) {
        self.record(LifecycleEvent::InitFailed(error.kind()));
    }

    fn run_starting(&self, handle: ClientHandle) {
        self.record(LifecycleEvent::RunStarting(handle));
    }

    fn agent_running(&self, handle: ClientHandle) {
        self.record(LifecycleEvent::AgentRunning(handle));
    }

    fn stop_requested(&self, handle: ClientHandle) {
        self.record(LifecycleEvent::StopRequested(handle));
    }

    fn client_stopped(&self, handle: ClientHandle) {
        self.record(LifecycleEvent::ClientStopped(handle));
    }

    fn client_failed(&self, handle: ClientHandle, error: &ClientError) {
        self.record(LifecycleEvent::ClientFailed(handle, error.kind()));
    }
}
