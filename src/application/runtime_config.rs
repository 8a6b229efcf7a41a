use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub manifest: PathBuf,
    pub color: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let color = !cli.no_color
            && supports_color::on(supports_color::Stream::Stdout).is_some();
        Self {
            manifest: cli.manifest,
            color,
        }
    }
}
