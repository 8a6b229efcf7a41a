mod config;

pub use config::{EnvironmentConfig, EnvironmentConfigError};
