//! Scenario world shared by the client lifecycle steps.

use std::cell::RefCell;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::controller::ClientState;
use crate::errors::ClientError;
use crate::registry::{ClientHandle, ClientRegistry};

use super::{AgentProbe, AgentScript, RecordingLifecycleReporter, ScriptedFactory};

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Builds a fresh world per scenario.
pub fn world() -> RefCell<ClientWorld> {
    RefCell::new(ClientWorld::new())
}

/// Scenario world driving one registry and at most one client.
pub struct ClientWorld {
    pub script: AgentScript,
    pub build_failure: Option<String>,
    pub reporter: Arc<RecordingLifecycleReporter>,
    registry: Option<Arc<ClientRegistry<ScriptedFactory>>>,
    probe: Option<Arc<AgentProbe>>,
    handle: Option<ClientHandle>,
    init_error: Option<ClientError>,
    background: Option<(Instant, JoinHandle<Result<(), ClientError>>)>,
    run_result: Option<Result<(), ClientError>>,
    run_elapsed: Option<Duration>,
    second_run: Option<Result<(), ClientError>>,
}

impl ClientWorld {
    pub fn new() -> Self {
        Self {
            script: AgentScript::default(),
            build_failure: None,
            reporter: Arc::new(RecordingLifecycleReporter::default()),
            registry: None,
            probe: None,
            handle: None,
            init_error: None,
            background: None,
            run_result: None,
            run_elapsed: None,
            second_run: None,
        }
    }

    /// Builds the registry from the scripted agent settings on first use.
    pub fn registry(&mut self) -> Arc<ClientRegistry<ScriptedFactory>> {
        if let Some(registry) = &self.registry {
            return Arc::clone(registry);
        }
        let factory = match &self.build_failure {
            Some(message) => ScriptedFactory::failing(message),
            None => ScriptedFactory::new(self.script.clone()),
        };
        self.probe = Some(factory.probe());
        let registry = Arc::new(ClientRegistry::with_reporter(
            factory,
            self.reporter.clone(),
        ));
        self.registry = Some(Arc::clone(&registry));
        registry
    }

    pub fn init(&mut self, config_path: &str, device_name: &str) {
        match self.registry().init(config_path, device_name) {
            Ok(handle) => self.handle = Some(handle),
            Err(error) => self.init_error = Some(error),
        }
    }

    pub fn handle(&self) -> Result<ClientHandle, String> {
        self.handle
            .ok_or_else(|| format!("no client handle; init error: {:?}", self.init_error))
    }

    pub fn init_error(&self) -> Option<&ClientError> {
        self.init_error.as_ref()
    }

    pub fn probe(&self) -> Result<Arc<AgentProbe>, String> {
        self.probe
            .clone()
            .ok_or_else(|| "no agent factory was created".to_owned())
    }

    pub fn state(&mut self) -> Result<ClientState, String> {
        let handle = self.handle()?;
        Ok(self.registry().state(handle))
    }

    pub fn run_in_background(&mut self) -> Result<(), String> {
        let handle = self.handle()?;
        let registry = self.registry();
        let started = Instant::now();
        self.background = Some((started, thread::spawn(move || registry.run(handle))));
        Ok(())
    }

    pub fn run_in_foreground(&mut self) -> Result<(), String> {
        let handle = self.handle()?;
        let result = self.registry().run(handle);
        self.run_result = Some(result);
        Ok(())
    }

    pub fn run_again(&mut self) -> Result<(), String> {
        let handle = self.handle()?;
        let result = self.registry().run(handle);
        self.second_run = Some(result);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), String> {
        let handle = self.handle()?;
        self.registry().stop(handle);
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), String> {
        let handle = self.handle()?;
        self.registry().release(handle);
        Ok(())
    }

    pub fn wait_for_state(&mut self, expected: ClientState) -> Result<(), String> {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        loop {
            let state = self.state()?;
            if state == expected {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(format!("client stayed {state}, expected {expected}"));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Waits for the background run to return, recording its result.
    pub fn join_run(&mut self) -> Result<(), String> {
        if self.run_result.is_some() {
            return Ok(());
        }
        let (started, runner) = self
            .background
            .take()
            .ok_or_else(|| "client is not running in the background".to_owned())?;
        let deadline = started + WAIT_TIMEOUT;
        while !runner.is_finished() {
            if Instant::now() >= deadline {
                return Err("run did not return after stop".to_owned());
            }
            thread::sleep(POLL_INTERVAL);
        }
        self.run_elapsed = Some(started.elapsed());
        let result = runner
            .join()
            .map_err(|_| "run thread panicked".to_owned())?;
        self.run_result = Some(result);
        Ok(())
    }

    pub fn run_result(&mut self) -> Result<&Result<(), ClientError>, String> {
        self.join_run()?;
        self.run_result
            .as_ref()
            .ok_or_else(|| "run result missing".to_owned())
    }

    pub const fn run_elapsed(&self) -> Option<Duration> {
        self.run_elapsed
    }

    pub const fn second_run(&self) -> Option<&Result<(), ClientError>> {
        self.second_run.as_ref()
    }
}
