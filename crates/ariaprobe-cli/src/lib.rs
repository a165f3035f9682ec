//! Ariaprobe CLI library
//!
//! Argument parsing, plan resolution, logging setup and transcript output
//! for the `ariaprobe` binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{Reporter, RunSpinner};
pub use runner::{exit_code, exit_status, CheckRunner, EXIT_ERROR, EXIT_FAILED, EXIT_PASSED};
