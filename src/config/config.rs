use std::path::Path;

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::ext::BestEffortPathExt;
use crate::filesystem::{TreeMap, TreeNode};

const SEED_KEY: &str = "seed";
const ARGUMENTS_KEY: &str = "args";
const ENVIRONMENT_KEY: &str = "env";
const FILESYSTEM_KEY: &str = "filesystem";

/// Everything needed to construct an [`Environment`](crate::environment::Environment).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub seed: u64,
    pub arguments: Vec<String>,
    pub environment: LinkedHashMap<String, String>,
    /// Contents of the preopened root; `None` means no root is offered.
    pub filesystem: Option<TreeMap>,
}

impl EnvironmentConfig {
    pub async fn read(path: &Path) -> Result<Self, EnvironmentConfigError> {
        debug!("Reading environment manifest: {}", path.best_effort_path_display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        debug!("Read environment manifest: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    fn parse_seed(value: &Yaml) -> Result<u64, EnvironmentConfigError> {
        match value {
            Yaml::Value(Scalar::Integer(seed)) => {
                u64::try_from(*seed).map_err(|_| EnvironmentConfigError::InvalidSeed)
            }
            _ => Err(EnvironmentConfigError::InvalidSeed),
        }
    }

    fn parse_arguments(value: &Yaml) -> Result<Vec<String>, EnvironmentConfigError> {
        value
            .as_sequence()
            .ok_or(EnvironmentConfigError::InvalidArguments)?
            .iter()
            .map(|argument| {
                argument
                    .as_str()
                    .map(str::to_string)
                    .ok_or(EnvironmentConfigError::InvalidArguments)
            })
            .collect()
    }

    fn parse_environment(
        value: &Yaml,
    ) -> Result<LinkedHashMap<String, String>, EnvironmentConfigError> {
        value
            .as_mapping()
            .ok_or(EnvironmentConfigError::InvalidEnvironment {
                key: ENVIRONMENT_KEY.to_string(),
            })?
            .iter()
            .map(|(key, value)| match (key.as_str(), value.as_str()) {
                (Some(key), Some(value)) => Ok((key.to_string(), value.to_string())),
                _ => Err(EnvironmentConfigError::InvalidEnvironment {
                    key: format!("{:?}", key),
                }),
            })
            .collect()
    }

    fn parse_tree(value: &Yaml, prefix: &str) -> Result<TreeMap, EnvironmentConfigError> {
        let mapping = value.as_mapping().ok_or(EnvironmentConfigError::InvalidTree {
            path: prefix.to_string(),
        })?;

        let mut tree = TreeMap::new();
        for (key, value) in mapping {
            let Some(name) = key
                .as_str()
                .filter(|name| !matches!(*name, "" | "." | "..") && !name.contains('/'))
            else {
                return Err(EnvironmentConfigError::InvalidTree {
                    path: format!("{}/{:?}", prefix, key),
                });
            };
            let path = format!("{}/{}", prefix, name);
            let node = match value {
                Yaml::Value(Scalar::String(text)) => TreeNode::Text(text.to_string()),
                Yaml::Sequence(items) => TreeNode::Bytes(Self::parse_bytes(items, &path)?),
                Yaml::Mapping(_) => TreeNode::Directory(Self::parse_tree(value, &path)?),
                _ => return Err(EnvironmentConfigError::InvalidTree { path }),
            };
            tree.insert(name.to_string(), node);
        }
        Ok(tree)
    }

    fn parse_bytes(items: &[Yaml], path: &str) -> Result<Vec<u8>, EnvironmentConfigError> {
        items
            .iter()
            .map(|item| match item {
                Yaml::Value(Scalar::Integer(byte)) => u8::try_from(*byte).ok(),
                _ => None,
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| EnvironmentConfigError::InvalidTree {
                path: path.to_string(),
            })
    }
}

impl TryFrom<&str> for EnvironmentConfig {
    type Error = EnvironmentConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents
            .first()
            .ok_or(EnvironmentConfigError::MalformedConfig)?;
        let top_level = document
            .as_mapping()
            .ok_or(EnvironmentConfigError::TopLevelNotMap)?;

        let mut config = Self::default();
        for (key, value) in top_level {
            match key.as_str() {
                Some(SEED_KEY) => config.seed = Self::parse_seed(value)?,
                Some(ARGUMENTS_KEY) => config.arguments = Self::parse_arguments(value)?,
                Some(ENVIRONMENT_KEY) => config.environment = Self::parse_environment(value)?,
                Some(FILESYSTEM_KEY) => config.filesystem = Some(Self::parse_tree(value, "")?),
                _ => warn!("Ignoring unknown manifest key: {:?}", key),
            }
        }

        debug!(
            "Parsed environment manifest: seed {}, {} arguments, {} variables",
            config.seed,
            config.arguments.len(),
            config.environment.len()
        );
        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum EnvironmentConfigError {
    #[snafu(display("Failed to read the environment manifest: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Environment manifest {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the environment manifest"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted environment manifest"))]
    MalformedConfig,
    #[snafu(display("Top level of the environment manifest should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Seed should be a non-negative integer"))]
    InvalidSeed,
    #[snafu(display("Arguments should be a list of strings"))]
    InvalidArguments,
    #[snafu(display("Environment variable {} should map a string to a string", key))]
    InvalidEnvironment { key: String },
    #[snafu(display("Invalid filesystem entry at '{}'", path))]
    InvalidTree { path: String },
}
