//! Structured reporting for client lifecycle events.

use std::sync::Arc;

use burrow_config::ClientConfig;

use crate::errors::ClientError;
use crate::registry::ClientHandle;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Observer trait used to surface lifecycle transitions to telemetry sinks.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked after a client was initialised.
    fn init_succeeded(&self, handle: ClientHandle, config: &ClientConfig);

    /// Invoked when initialisation was rejected.
    fn init_failed(&self, error: &ClientError);

    /// Invoked before the agent is started.
    fn run_starting(&self, handle: ClientHandle);

    /// Invoked once the agent reports it has started.
    fn agent_running(&self, handle: ClientHandle);

    /// Invoked when a stop is accepted for a live client.
    fn stop_requested(&self, handle: ClientHandle);

    /// Invoked when the client reaches `stopped`.
    fn client_stopped(&self, handle: ClientHandle);

    /// Invoked when the client reaches `failed`.
    fn client_failed(&self, handle: ClientHandle, error: &ClientError);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter + ?Sized,
{
    fn init_succeeded(&self, handle: ClientHandle, config: &ClientConfig) {
        (**self).init_succeeded(handle, config);
    }

    fn init_failed(&self, error: &ClientError) {
        (**self).init_failed(error);
    }

    fn run_starting(&self, handle: ClientHandle) {
        (**self).run_starting(handle);
    }

    fn agent_running(&self, handle: ClientHandle) {
        (**self).agent_running(handle);
    }

    fn stop_requested(&self, handle: ClientHandle) {
        (**self).stop_requested(handle);
    }

    fn client_stopped(&self, handle: ClientHandle) {
        (**self).client_stopped(handle);
    }

    fn client_failed(&self, handle: ClientHandle, error: &ClientError) {
        (**self).client_failed(handle, error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn init_succeeded(&self, handle: ClientHandle, config: &ClientConfig) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "init_succeeded",
            %handle,
            config_path = %config.config_path(),
            device_name = config.device_name(),
            state_path = ?config.state_path(),
            "client initialised"
        );
    }

    fn init_failed(&self, error: &ClientError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "init_failed",
            kind = %error.kind(),
            error = %error,
            "client initialisation failed"
        );
    }

    fn run_starting(&self, handle: ClientHandle) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "run_starting",
            %handle,
            "starting network agent"
        );
    }

    fn agent_running(&self, handle: ClientHandle) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "agent_running",
            %handle,
            "network agent running"
        );
    }

    fn stop_requested(&self, handle: ClientHandle) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "stop_requested",
            %handle,
            "stop requested"
        );
    }

    fn client_stopped(&self, handle: ClientHandle) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "client_stopped",
            %handle,
            "client stopped"
        );
    }

    fn client_failed(&self, handle: ClientHandle, error: &ClientError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "client_failed",
            %handle,
            kind = %error.kind(),
            error = %error,
            "network agent failed"
        );
    }
}
