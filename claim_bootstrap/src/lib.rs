// /////////////////////////////////////////////////////////////////////////////
// Claim Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! Bootstrap layer: entry point, signal handling, and CLI argument parsing.
//! Sits outside `claim_domain`/`claim_engine` and is the only crate allowed
//! to depend on both, wiring the composition root
//! ([`claim_engine::presentation::Dispatcher`]) to a running process.
//!
//! - `cli` - clap parsing plus path-argument validation
//! - `exit_code` - BSD sysexits.h exit code mapping
//! - `logger` - bootstrap-phase logging abstraction
//! - `shutdown` - cancellation token and grace-period coordination
//! - `signals` - SIGTERM/SIGINT/SIGHUP handling

pub mod cli;
pub mod exit_code;
pub mod logger;
pub mod shutdown;
pub mod signals;

pub use cli::{Cli, CliError};
pub use exit_code::ExitCode;
