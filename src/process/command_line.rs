use hashlink::LinkedHashMap;

/// Fixed arguments and environment variables handed to a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    arguments: Vec<String>,
    environment: LinkedHashMap<String, String>,
}

impl CommandLine {
    pub fn new(arguments: Vec<String>, environment: LinkedHashMap<String, String>) -> Self {
        Self {
            arguments,
            environment,
        }
    }

    pub fn get_arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn get_environment(&self) -> Vec<(String, String)> {
        self.environment
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// No working directory is configured for components.
    pub fn get_initial_cwd(&self) -> Option<&str> {
        None
    }
}
