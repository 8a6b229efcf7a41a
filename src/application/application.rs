use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::{RuntimeConfig, render_listing};
use crate::config::{EnvironmentConfig, EnvironmentConfigError};
use crate::environment::Environment;
use crate::filesystem::ErrorCode;

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        colored::control::set_override(runtime_config.color);

        let config = EnvironmentConfig::read(&runtime_config.manifest)
            .await
            .context(ConfigSnafu)?;
        debug!("Loaded environment manifest: {:?}", config);

        let environment = Environment::new(config);
        info!(
            "Environment ready with {} preopened directories",
            environment.get_directories().len()
        );
        print!("{}", Self::describe(&environment, runtime_config.color)?);

        Ok(())
    }

    /// Human-readable summary of what a component would observe.
    pub fn describe(environment: &Environment, color: bool) -> Result<String, ApplicationError> {
        let command_line = environment.command_line();
        let mut output = String::new();

        output.push_str(&format!("arguments: {:?}\n", command_line.get_arguments()));
        output.push_str("environment:\n");
        for (key, value) in command_line.get_environment() {
            output.push_str(&format!("  {}={}\n", key, value));
        }

        let directories = environment.get_directories();
        if directories.is_empty() {
            output.push_str("no preopened directories\n");
        }
        for (descriptor, name) in directories {
            let listing = render_listing(&descriptor, &name, color).context(ListingSnafu { name })?;
            output.push_str(&listing);
        }
        Ok(output)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the environment manifest"))]
    ConfigError { source: EnvironmentConfigError },
    #[snafu(display("Failed to list preopened directory '{}'", name))]
    ListingError { name: String, source: ErrorCode },
}
