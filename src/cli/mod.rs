//! Command-line layer.
//!
//! The library never prints; everything user-facing lives here.

mod args;
mod commands;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, Command, TransformArgs};
pub use exit_status::ExitStatus;
pub use run::run_cli;
