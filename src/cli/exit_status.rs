use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): every file transformed
/// - `Failure` (1): a file failed, or issues were reported under `--strict`
/// - `Error` (2): internal error (config or messages unreadable)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
