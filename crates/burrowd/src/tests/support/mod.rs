//! Test harness utilities for the lifecycle suites.

mod agent;
mod reporter;
mod world;

use mockall::mock;

use crate::agent::{AgentExit, AgentFault, NetworkAgent};

pub use agent::{AgentProbe, AgentScript, ScriptedFactory};
pub use reporter::{LifecycleEvent, RecordingLifecycleReporter};
pub use world::{ClientWorld, world};

mock! {
    pub Agent {}
    impl NetworkAgent for Agent {
        fn start(&self) -> Result<(), AgentFault>;
        fn stop(&self);
        fn wait_for_exit(&self) -> AgentExit;
    }
}
