//! Termination signal listeners for the host binary.

use std::io;
use std::sync::{Mutex, PoisonError};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::{debug, info};

use crate::signal::StopSignal;

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Install`] when the listener cannot be set up.
    fn wait(&self) -> Result<(), ShutdownError>;

    /// Releases a pending or future [`ShutdownSignal::wait`] once the host no
    /// longer needs the notification.
    fn cancel(&self);
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Listener that waits for SIGTERM, SIGINT, SIGQUIT or SIGHUP.
#[derive(Debug, Default)]
pub struct SystemShutdownSignal {
    listener: Mutex<Listener>,
}

#[derive(Debug, Default)]
struct Listener {
    handle: Option<Handle>,
    cancelled: bool,
}

impl SystemShutdownSignal {
    /// Builds a listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = {
            let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
            if listener.cancelled {
                return Ok(());
            }
            let registered = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
                .map_err(|source| ShutdownError::Install { source })?;
            listener.handle = Some(registered.handle());
            registered
        };
        match signals.forever().next() {
            Some(signal) => info!(target: HOST_TARGET, signal, "shutdown signal received"),
            None => debug!(target: HOST_TARGET, "shutdown listener cancelled"),
        }
        Ok(())
    }

    fn cancel(&self) {
        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        listener.cancelled = true;
        if let Some(handle) = listener.handle.take() {
            handle.close();
        }
    }
}

/// In-process shutdown trigger backed by a [`StopSignal`].
impl ShutdownSignal for StopSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        Self::wait(self);
        Ok(())
    }

    fn cancel(&self) {
        self.trigger();
    }
}
