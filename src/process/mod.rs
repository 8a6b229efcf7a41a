//! Command-line surface of a sandboxed component: its arguments and
//! environment, exit requests and terminal output.

mod command_line;
mod exit;
mod terminal;

pub use command_line::CommandLine;
pub use exit::{ExitSignal, exit, exit_with_code};
pub use terminal::TerminalOutput;
