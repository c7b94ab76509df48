//! Entry point for the `burrowd` host binary.
//!
//! Delegates to [`burrowd::run_cli`], which parses the host settings,
//! initialises telemetry and runs one client until a termination signal
//! arrives.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    burrowd::run_cli(std::env::args_os(), &mut io::stderr())
}
