//! Placeholder agent used by the host binary until a networking engine is
//! linked in.

use burrow_config::ClientConfig;

use crate::agent::{AgentBuildError, AgentExit, AgentFactory, AgentFault, NetworkAgent};
use crate::signal::StopSignal;

const AGENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::agent::idle");

/// Agent that brings up nothing and stays alive until it is stopped.
#[derive(Debug)]
pub struct IdleAgent {
    device_name: String,
    stop: StopSignal,
}

impl IdleAgent {
    /// Builds an idle agent for `device_name`.
    #[must_use]
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            stop: StopSignal::new(),
        }
    }
}

impl NetworkAgent for IdleAgent {
    fn start(&self) -> Result<(), AgentFault> {
        tracing::warn!(
            target: AGENT_TARGET,
            device = %self.device_name,
            "no network engine linked; idling until stopped"
        );
        Ok(())
    }

    fn stop(&self) {
        self.stop.trigger();
    }

    fn wait_for_exit(&self) -> AgentExit {
        self.stop.wait();
        AgentExit::Clean
    }
}

/// Factory producing [`IdleAgent`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleAgentFactory;

impl AgentFactory for IdleAgentFactory {
    type Agent = IdleAgent;

    fn build(&self, config: &ClientConfig) -> Result<Self::Agent, AgentBuildError> {
        Ok(IdleAgent::new(config.device_name()))
    }
}
