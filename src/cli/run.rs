use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{init::init, transform::transform},
    exit_status::ExitStatus,
};

/// Main entry point for the bake CLI.
///
/// Dispatches to the command handler. `Err` means an internal error
/// (config or messages unreadable) and maps to exit status 2.
pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(Arguments {
        command: Some(command),
    }) = args.with_command_or_help()
    else {
        return Ok(ExitStatus::Success);
    };

    match command {
        Command::Transform(args) => transform(args),
        Command::Init => init(),
    }
}
