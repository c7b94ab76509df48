//! Host harness: runs one client until a termination signal arrives.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::{Arc, mpsc};
use std::thread;

use burrow_config::{ClientConfig, HostArgs};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::agent::AgentFactory;
use crate::controller::ClientState;
use crate::errors::{ClientError, InvalidStateError};
use crate::idle_agent::IdleAgentFactory;
use crate::registry::ClientRegistry;
use crate::reporter::{LifecycleReporter, StructuredLifecycleReporter};
use crate::shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};
use crate::telemetry::{self, TelemetryError};

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Exit status for failures the caller can fix by changing its settings.
const USAGE_EXIT_CODE: u8 = 2;

/// Errors that end the host process unsuccessfully.
#[derive(Debug, Error)]
pub enum HostError {
    /// Telemetry could not be configured.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The client could not be initialised or its run failed.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// The shutdown listener could not be installed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
    /// A host thread could not be spawned.
    #[error("failed to spawn {thread} thread: {source}")]
    Spawn {
        /// Role of the thread.
        thread: &'static str,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The client run thread panicked.
    #[error("client run thread panicked")]
    RunPanicked,
}

impl HostError {
    /// Process exit status for this failure.
    ///
    /// Client errors the caller must fix before retrying, such as a blank
    /// device name, exit with status 2. Everything else exits with 1.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Client(error) if error.kind().is_caller_fault() => {
                ExitCode::from(USAGE_EXIT_CODE)
            }
            _ => ExitCode::FAILURE,
        }
    }
}

/// Collaborators needed to run the host sequence.
pub struct HostPlan<F, S> {
    /// Validated configuration for the single client.
    pub config: ClientConfig,
    /// Builds the client's network agent.
    pub factory: F,
    /// Receives lifecycle events.
    pub reporter: Arc<dyn LifecycleReporter>,
    /// Tells the host when to stop the client.
    pub shutdown: S,
}

/// Parses `args`, runs the host and maps the outcome to an exit code.
///
/// Failures are written to `stderr`.
pub fn run_cli<I, T, W>(args: I, stderr: &mut W) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let host_args = match HostArgs::try_parse_args(args) {
        Ok(parsed) => parsed,
        Err(error) => {
            let code = if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            if error.print().is_err() {
                return ExitCode::FAILURE;
            }
            return code;
        }
    };

    match run_host(&host_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(stderr, "burrowd: {error}").is_err() {
                warn!(target: HOST_TARGET, %error, "failed to report host error");
            }
            error.exit_code()
        }
    }
}

/// Runs the host with production collaborators.
///
/// # Errors
///
/// Returns a [`HostError`] when telemetry, the configuration, the signal
/// listener or the client run fails.
pub fn run_host(args: &HostArgs) -> Result<(), HostError> {
    telemetry::initialise(args)?;
    let config = args.client_config().map_err(ClientError::from)?;
    run_host_with(HostPlan {
        config,
        factory: IdleAgentFactory,
        reporter: Arc::new(StructuredLifecycleReporter::new()),
        shutdown: SystemShutdownSignal::new(),
    })
}

/// Runs the host sequence with injected collaborators.
///
/// The client runs on its own thread while a watcher thread waits for the
/// shutdown signal and then stops the client. The call returns once the run
/// has finished, whether because of the signal or because the agent exited,
/// and the watcher has been released and joined.
///
/// A shutdown that lands before the client starts running leaves it stopped
/// without ever starting the agent; that still counts as a clean exit.
///
/// # Errors
///
/// Returns a [`HostError`] when the client cannot be initialised, the run
/// fails, the shutdown listener fails or a thread cannot be spawned.
pub fn run_host_with<F, S>(plan: HostPlan<F, S>) -> Result<(), HostError>
where
    F: AgentFactory + 'static,
    S: ShutdownSignal + 'static,
{
    let HostPlan {
        config,
        factory,
        reporter,
        shutdown: signal,
    } = plan;

    info!(
        target: HOST_TARGET,
        device = config.device_name(),
        "starting host"
    );
    let registry = Arc::new(ClientRegistry::with_reporter(factory, reporter));
    let handle = registry.init_config(config)?;
    let listener = Arc::new(signal);

    let (watch_tx, watch_rx) = mpsc::channel();
    let spawned_watcher = {
        let watched = Arc::clone(&registry);
        let waiting = Arc::clone(&listener);
        thread::Builder::new()
            .name("burrowd-shutdown".to_owned())
            .spawn(move || {
                let outcome = waiting.wait();
                if watch_tx.send(outcome).is_err() {
                    return;
                }
                watched.stop(handle);
            })
    };
    let watcher = match spawned_watcher {
        Ok(spawned) => spawned,
        Err(source) => {
            registry.release(handle);
            return Err(HostError::Spawn {
                thread: "shutdown watcher",
                source,
            });
        }
    };

    let spawned_runner = {
        let running = Arc::clone(&registry);
        thread::Builder::new()
            .name("burrowd-client".to_owned())
            .spawn(move || running.run(handle))
    };
    let run = match spawned_runner {
        Ok(runner) => runner.join().map_err(|_| HostError::RunPanicked),
        Err(source) => Err(HostError::Spawn {
            thread: "client run",
            source,
        }),
    };

    // Anything the watcher reports after cancellation is not a shutdown.
    let signalled = watch_rx.try_recv().ok();
    listener.cancel();
    if watcher.join().is_err() {
        warn!(target: HOST_TARGET, "shutdown watcher panicked");
    }
    registry.release(handle);
    let listener_outcome =
        signalled.or_else(|| watch_rx.try_recv().ok().filter(Result::is_err));
    let shutdown_requested = matches!(listener_outcome, Some(Ok(())));

    match run? {
        Ok(()) => {}
        Err(error) if shutdown_requested && stopped_before_running(&error) => {
            debug!(
                target: HOST_TARGET,
                %handle,
                "shutdown arrived before the client started running"
            );
        }
        Err(error) => return Err(error.into()),
    }
    if let Some(Err(error)) = listener_outcome {
        return Err(error.into());
    }
    info!(target: HOST_TARGET, "shutdown sequence completed");
    Ok(())
}

fn stopped_before_running(error: &ClientError) -> bool {
    error.invalid_state()
        == Some(InvalidStateError::NotRunnable {
            state: ClientState::Stopped,
        })
}
