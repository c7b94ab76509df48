//! Lifecycle controller for an embedded, long-running network client.
//!
//! A host application hands the controller a configuration path and a device
//! name, receives an opaque [`ClientHandle`], and then drives the client with
//! three operations: `init`, a blocking `run`, and a non-blocking, idempotent
//! `stop` that may arrive from any thread at any time. The networking engine
//! itself sits behind the [`NetworkAgent`] trait; the controller only starts
//! it, waits for it to exit and translates its failures into [`ClientError`]s
//! with a stable [`ErrorKind`].
//!
//! [`ClientRegistry`] is the handle-addressed surface a foreign-call boundary
//! adapter forwards to. Each handle owns one [`LifecycleController`], which
//! serialises every state transition so a stop is never lost and the agent is
//! never started twice.
//!
//! The `burrowd` binary wraps the same surface in a small host process that
//! runs one client until SIGTERM, SIGINT, SIGQUIT or SIGHUP arrives.

mod agent;
mod controller;
mod errors;
mod host;
mod idle_agent;
mod registry;
mod reporter;
mod shutdown;
mod signal;
mod status;
mod telemetry;

pub use agent::{
    AgentBuildError, AgentErrorSource, AgentExit, AgentFactory, AgentFault, NetworkAgent,
};
pub use controller::{ClientState, LifecycleController};
pub use errors::{ClientError, ErrorKind, ErrorRecord, InvalidStateError};
pub use host::{HostError, HostPlan, run_cli, run_host, run_host_with};
pub use idle_agent::{IdleAgent, IdleAgentFactory};
pub use registry::{ClientHandle, ClientRegistry};
pub use reporter::{LifecycleReporter, StructuredLifecycleReporter};
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};
pub use signal::StopSignal;
pub use status::ClientStatus;
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
