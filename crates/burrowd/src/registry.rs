//! Handle-addressed surface the boundary adapter forwards to.
//!
//! The registry owns one [`LifecycleController`] per live handle and is the
//! only place handles are minted. The host holds nothing but the opaque
//! [`ClientHandle`]; releasing it drops the registry's reference, while a run
//! still in progress keeps its controller alive until it returns.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use burrow_config::ClientConfig;
use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::debug;

use crate::agent::AgentFactory;
use crate::controller::{ClientState, LifecycleController};
use crate::errors::{ClientError, InvalidStateError};
use crate::reporter::{LifecycleReporter, StructuredLifecycleReporter};
use crate::status::ClientStatus;

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Opaque identifier for one initialised client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientHandle(u64);

impl ClientHandle {
    /// Rebuilds a handle from the raw value previously handed to the host.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value suitable for crossing the embedding boundary.
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "client-{}", self.0)
    }
}

type Controllers<A> = HashMap<ClientHandle, Arc<LifecycleController<A>>>;

/// Table of live clients keyed by handle.
pub struct ClientRegistry<F>
where
    F: AgentFactory,
{
    factory: F,
    reporter: Arc<dyn LifecycleReporter>,
    clients: Mutex<Controllers<F::Agent>>,
    next_handle: AtomicU64,
}

impl<F> ClientRegistry<F>
where
    F: AgentFactory,
{
    /// Builds a registry that reports through `tracing`.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self::with_reporter(factory, Arc::new(StructuredLifecycleReporter::new()))
    }

    /// Builds a registry with a custom lifecycle reporter.
    #[must_use]
    pub fn with_reporter(factory: F, reporter: Arc<dyn LifecycleReporter>) -> Self {
        Self {
            factory,
            reporter,
            clients: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Validates the configuration, allocates an agent and returns a handle
    /// to the new `initialized` client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for an unusable configuration and
    /// [`ClientError::AgentConstruction`] when the agent cannot be built. No
    /// handle is produced and nothing stays allocated in either case.
    pub fn init(
        &self,
        config_path: impl Into<Utf8PathBuf>,
        device_name: impl Into<String>,
    ) -> Result<ClientHandle, ClientError> {
        ClientConfig::new(config_path, device_name)
            .map_err(ClientError::from)
            .and_then(|config| self.init_with(config))
            .inspect_err(|error| self.reporter.init_failed(error))
    }

    /// Like [`ClientRegistry::init`] for an already validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AgentConstruction`] when the agent cannot be
    /// built.
    pub fn init_config(&self, config: ClientConfig) -> Result<ClientHandle, ClientError> {
        self.init_with(config)
            .inspect_err(|error| self.reporter.init_failed(error))
    }

    fn init_with(&self, config: ClientConfig) -> Result<ClientHandle, ClientError> {
        let agent = self.factory.build(&config)?;
        let handle = ClientHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.reporter.init_succeeded(handle, &config);
        let controller = LifecycleController::new(handle, config, agent, self.reporter.clone());
        self.clients().insert(handle, Arc::new(controller));
        Ok(handle)
    }

    /// Runs the client behind `handle`, blocking until its agent exits.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidState`] for unknown handles and for
    /// clients that are not `initialized`, and [`ClientError::Runtime`] when
    /// the agent fails.
    pub fn run(&self, handle: ClientHandle) -> Result<(), ClientError> {
        let Some(controller) = self.lookup(handle) else {
            debug!(target: REGISTRY_TARGET, %handle, "run on unknown handle");
            return Err(InvalidStateError::for_run(ClientState::Uninitialized).into());
        };
        controller.run()
    }

    /// Requests the client behind `handle` to stop. Unknown handles are
    /// ignored.
    pub fn stop(&self, handle: ClientHandle) {
        match self.lookup(handle) {
            Some(controller) => controller.stop(),
            None => debug!(target: REGISTRY_TARGET, %handle, "stop on unknown handle"),
        }
    }

    /// Current state of the client, `uninitialized` for unknown handles.
    #[must_use]
    pub fn state(&self, handle: ClientHandle) -> ClientState {
        self.lookup(handle)
            .map_or(ClientState::Uninitialized, |controller| controller.state())
    }

    /// Snapshot of the client, or `None` for unknown handles.
    #[must_use]
    pub fn status(&self, handle: ClientHandle) -> Option<ClientStatus> {
        self.lookup(handle).map(|controller| controller.status())
    }

    /// Stops the client and forgets its handle.
    pub fn release(&self, handle: ClientHandle) {
        let removed = self.clients().remove(&handle);
        if let Some(controller) = removed {
            controller.stop();
            debug!(target: REGISTRY_TARGET, %handle, "handle released");
        }
    }

    /// Number of handles currently registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients().len()
    }

    /// Returns `true` when no handle is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients().is_empty()
    }

    fn lookup(&self, handle: ClientHandle) -> Option<Arc<LifecycleController<F::Agent>>> {
        self.clients().get(&handle).cloned()
    }

    fn clients(&self) -> MutexGuard<'_, Controllers<F::Agent>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ClientHandle::from_raw(1), "client-1")]
    #[case(ClientHandle::from_raw(42), "client-42")]
    fn handle_display(#[case] handle: ClientHandle, #[case] expected: &str) {
        assert_eq!(handle.to_string(), expected);
        assert_eq!(ClientHandle::from_raw(handle.as_raw()), handle);
    }

    #[rstest]
    fn handle_serialises_as_raw_number() {
        let json = serde_json::to_string(&ClientHandle::from_raw(9)).expect("handle serialises");
        assert_eq!(json, "9");
    }
}
