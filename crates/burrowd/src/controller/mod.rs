//! Per-handle lifecycle state machine around one network agent.
//!
//! `run` is the only blocking operation. Every transition happens inside one
//! critical section per controller, so a stop can never be lost and the agent
//! can never be started twice. The stop request reaches the agent exactly
//! once: `stop` delivers it when the agent has already started, otherwise `run`
//! delivers it as soon as `start` returns.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use burrow_config::ClientConfig;
use tracing::{debug, warn};

use crate::agent::{AgentExit, AgentFault, NetworkAgent};
use crate::errors::{ClientError, ErrorRecord, InvalidStateError};
use crate::registry::ClientHandle;
use crate::reporter::LifecycleReporter;
use crate::status::ClientStatus;

pub use state::ClientState;

const CONTROLLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::controller");

struct Lifecycle<A> {
    state: ClientState,
    agent: Option<Arc<A>>,
    agent_started: bool,
    last_error: Option<ErrorRecord>,
}

/// Owns one network agent and drives it through the client lifecycle.
pub struct LifecycleController<A> {
    handle: ClientHandle,
    config: ClientConfig,
    reporter: Arc<dyn LifecycleReporter>,
    inner: Mutex<Lifecycle<A>>,
}

impl<A> LifecycleController<A>
where
    A: NetworkAgent,
{
    /// Wraps an allocated, not yet started agent in the `initialized` state.
    #[must_use]
    pub fn new(
        handle: ClientHandle,
        config: ClientConfig,
        agent: A,
        reporter: Arc<dyn LifecycleReporter>,
    ) -> Self {
        Self {
            handle,
            config,
            reporter,
            inner: Mutex::new(Lifecycle {
                state: ClientState::Initialized,
                agent: Some(Arc::new(agent)),
                agent_started: false,
                last_error: None,
            }),
        }
    }

    /// Handle this controller was registered under.
    #[must_use]
    pub const fn handle(&self) -> ClientHandle {
        self.handle
    }

    /// Configuration the agent was built from.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        self.lock().state
    }

    /// Snapshot of the state and the last error recorded by `run`.
    #[must_use]
    pub fn status(&self) -> ClientStatus {
        let inner = self.lock();
        ClientStatus::new(
            self.handle,
            inner.state,
            self.config.device_name(),
            inner.last_error.clone(),
        )
    }

    /// Starts the agent and blocks until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidState`] unless the client is
    /// `initialized`, and [`ClientError::Runtime`] when the agent fails to
    /// start or faults while running without a stop having been requested.
    pub fn run(&self) -> Result<(), ClientError> {
        let agent = self.enter_running()?;
        let _active = ActiveRun { controller: self };
        self.reporter.run_starting(self.handle);

        if let Err(fault) = agent.start() {
            return Err(self.fail(self.lock(), fault));
        }

        let stop_pending = {
            let mut inner = self.lock();
            inner.agent_started = true;
            inner.state == ClientState::Stopping
        };
        self.reporter.agent_running(self.handle);
        if stop_pending {
            debug!(
                target: CONTROLLER_TARGET,
                handle = %self.handle,
                "delivering stop requested during start"
            );
            agent.stop();
        }

        let exit = agent.wait_for_exit();
        self.finish(exit)
    }

    /// Requests termination. Never blocks on the agent and never fails.
    pub fn stop(&self) {
        let mut inner = self.lock();
        let state = inner.state;
        match state {
            ClientState::Initialized => {
                inner.state = ClientState::Stopped;
                let agent = inner.agent.take();
                drop(inner);
                drop(agent);
                self.reporter.stop_requested(self.handle);
                self.reporter.client_stopped(self.handle);
            }
            ClientState::Running => {
                inner.state = ClientState::Stopping;
                let started = if inner.agent_started {
                    inner.agent.clone()
                } else {
                    None
                };
                drop(inner);
                self.reporter.stop_requested(self.handle);
                if let Some(agent) = started {
                    agent.stop();
                }
            }
            _ => {
                debug!(
                    target: CONTROLLER_TARGET,
                    handle = %self.handle,
                    %state,
                    "stop ignored"
                );
            }
        }
    }

    fn enter_running(&self) -> Result<Arc<A>, ClientError> {
        let mut inner = self.lock();
        let current = (inner.state, inner.agent.clone());
        match current {
            (ClientState::Initialized, Some(agent)) => {
                inner.state = ClientState::Running;
                Ok(agent)
            }
            (state, _) => {
                let error = InvalidStateError::for_run(state);
                debug!(
                    target: CONTROLLER_TARGET,
                    handle = %self.handle,
                    %state,
                    %error,
                    "run rejected"
                );
                Err(error.into())
            }
        }
    }

    /// Settles the exit under the same guard that observes `stopping`.
    fn finish(&self, exit: AgentExit) -> Result<(), ClientError> {
        let inner = self.lock();
        let stopping = inner.state == ClientState::Stopping;
        match exit {
            AgentExit::Faulted(fault) if !stopping => Err(self.fail(inner, fault)),
            AgentExit::Faulted(fault) => {
                self.settle(inner);
                warn!(
                    target: CONTROLLER_TARGET,
                    handle = %self.handle,
                    error = %fault,
                    "agent reported a fault while stopping"
                );
                Ok(())
            }
            AgentExit::Clean => {
                self.settle(inner);
                Ok(())
            }
        }
    }

    fn fail(&self, mut inner: MutexGuard<'_, Lifecycle<A>>, fault: AgentFault) -> ClientError {
        let error = ClientError::from(fault);
        inner.state = ClientState::Failed;
        inner.last_error = Some(error.record());
        drop(inner);
        self.reporter.client_failed(self.handle, &error);
        error
    }

    fn settle(&self, mut inner: MutexGuard<'_, Lifecycle<A>>) {
        inner.state = ClientState::Stopped;
        drop(inner);
        self.reporter.client_stopped(self.handle);
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle<A>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the agent on every way out of `run`.
///
/// A run that unwinds before reaching a terminal state is marked `failed`.
struct ActiveRun<'a, A> {
    controller: &'a LifecycleController<A>,
}

impl<A> Drop for ActiveRun<'_, A> {
    fn drop(&mut self) {
        let mut inner = self
            .controller
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let aborted = if inner.state.is_terminal() {
            None
        } else {
            warn!(
                target: CONTROLLER_TARGET,
                handle = %self.controller.handle,
                state = %inner.state,
                "run unwound before the agent exited"
            );
            let error = ClientError::from(AgentFault::new(
                "run aborted before the agent exited",
            ));
            inner.state = ClientState::Failed;
            inner.last_error = Some(error.record());
            Some(error)
        };
        let agent = inner.agent.take();
        drop(inner);
        drop(agent);
        if let Some(error) = aborted {
            self.controller
                .reporter
                .client_failed(self.controller.handle, &error);
        }
    }
}
