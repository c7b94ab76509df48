//! Scripted network agents for timing-sensitive lifecycle tests.
//!
//! Each agent follows an [`AgentScript`] and records what the controller did
//! to it in a shared [`AgentProbe`], including when it was dropped, so tests
//! can assert that resources were released.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use burrow_config::ClientConfig;

use crate::agent::{AgentBuildError, AgentExit, AgentFactory, AgentFault, NetworkAgent};
use crate::signal::StopSignal;

/// Behaviour a [`ScriptedAgent`] follows.
#[derive(Debug, Clone, Default)]
pub struct AgentScript {
    /// Fault returned from `start` instead of starting.
    pub start_failure: Option<String>,
    /// Time `start` takes before returning.
    pub start_delay: Duration,
    /// Fault reported without a stop request once this much time has passed.
    pub fault_after: Option<(Duration, String)>,
    /// Exit cleanly straight away without waiting for a stop.
    pub exit_on_its_own: bool,
    /// Time the agent needs to tear down after a stop.
    pub shutdown_delay: Duration,
    /// Fault reported while tearing down after a stop.
    pub fault_on_stop: Option<String>,
    /// Panic inside `wait_for_exit`.
    pub panic_while_running: bool,
}

/// Counters shared between a factory, its agents and the test.
#[derive(Debug, Default)]
pub struct AgentProbe {
    builds: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
    released: AtomicUsize,
}

impl AgentProbe {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// Agent driven by an [`AgentScript`].
#[derive(Debug)]
pub struct ScriptedAgent {
    script: AgentScript,
    probe: Arc<AgentProbe>,
    stop: StopSignal,
}

impl NetworkAgent for ScriptedAgent {
    fn start(&self) -> Result<(), AgentFault> {
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.script.start_delay);
        match &self.script.start_failure {
            Some(detail) => Err(AgentFault::new(detail.clone())),
            None => Ok(()),
        }
    }

    fn stop(&self) {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
        self.stop.trigger();
    }

    fn wait_for_exit(&self) -> AgentExit {
        assert!(
            !self.script.panic_while_running,
            "scripted agent crashed while running"
        );
        if self.script.exit_on_its_own {
            return AgentExit::Clean;
        }
        match &self.script.fault_after {
            Some((delay, detail)) => {
                if !self.stop.wait_timeout(*delay) {
                    return AgentExit::Faulted(AgentFault::new(detail.clone()));
                }
            }
            None => self.stop.wait(),
        }
        thread::sleep(self.script.shutdown_delay);
        match &self.script.fault_on_stop {
            Some(detail) => AgentExit::Faulted(AgentFault::new(detail.clone())),
            None => AgentExit::Clean,
        }
    }
}

impl Drop for ScriptedAgent {
    fn drop(&mut self) {
        self.probe.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory handing out [`ScriptedAgent`]s that share one probe.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFactory {
    script: AgentScript,
    build_failure: Option<String>,
    probe: Arc<AgentProbe>,
}

impl ScriptedFactory {
    pub fn new(script: AgentScript) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            build_failure: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub fn probe(&self) -> Arc<AgentProbe> {
        Arc::clone(&self.probe)
    }
}

impl AgentFactory for ScriptedFactory {
    type Agent = ScriptedAgent;

    fn build(&self, _config: &ClientConfig) -> Result<Self::Agent, AgentBuildError> {
        if let Some(message) = &self.build_failure {
            return Err(AgentBuildError::new(message.clone()));
        }
        self.probe.builds.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedAgent {
            script: self.script.clone(),
            probe: Arc::clone(&self.probe),
            stop: StopSignal::new(),
        })
    }
}
