use std::process::ExitCode;

use snafu::Snafu;
use tracing::info;

/// Request by the component to terminate the run.
///
/// Kept apart from the filesystem error vocabulary so callers can let it
/// pass through ordinary error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Snafu)]
#[snafu(display("Component exited with status {code}"))]
pub struct ExitSignal {
    pub code: u8,
}

impl ExitSignal {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

impl From<ExitSignal> for ExitCode {
    fn from(signal: ExitSignal) -> Self {
        ExitCode::from(signal.code)
    }
}

/// Success maps to status 0, any failure to 1.
pub fn exit(status: Result<(), ()>) -> ExitSignal {
    exit_with_code(if status.is_ok() { 0 } else { 1 })
}

pub fn exit_with_code(code: u8) -> ExitSignal {
    info!("Component requested exit with status {}", code);
    ExitSignal { code }
}
