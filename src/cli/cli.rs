use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Load an environment manifest and show what a component would see.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// YAML manifest describing the environment
    pub manifest: PathBuf,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Disable colored output
    #[clap(long)]
    pub no_color: bool,
}
