use tracing::debug;

use crate::clocks::{MonotonicClock, WallClock};
use crate::config::EnvironmentConfig;
use crate::filesystem::{Descriptor, ErrorCode, Filesystem, StreamError, directory_from_tree};
use crate::process::{self, CommandLine, ExitSignal, TerminalOutput};
use crate::random::SeededRandom;

/// Name under which the root directory is preopened.
pub const PREOPEN_NAME: &str = "/";

/// Host-side state seen by one sandboxed component.
///
/// Every instance owns its own tree, generator and terminals; instances
/// never share state.
#[derive(Debug)]
pub struct Environment {
    filesystem: Option<Filesystem>,
    random: SeededRandom,
    monotonic_clock: MonotonicClock,
    wall_clock: WallClock,
    command_line: CommandLine,
    stdout: TerminalOutput,
    stderr: TerminalOutput,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(EnvironmentConfig::default())
    }
}

impl Environment {
    pub fn new(config: EnvironmentConfig) -> Self {
        debug!(
            "Creating environment with seed {} and {} root",
            config.seed,
            if config.filesystem.is_some() { "a" } else { "no" }
        );
        Self {
            filesystem: config.filesystem.as_ref().map(directory_from_tree),
            random: SeededRandom::new(config.seed),
            monotonic_clock: MonotonicClock::new(),
            wall_clock: WallClock,
            command_line: CommandLine::new(config.arguments, config.environment),
            stdout: TerminalOutput::stdout(),
            stderr: TerminalOutput::stderr(),
        }
    }

    /// Preopened directories: the root under [`PREOPEN_NAME`], if configured.
    pub fn get_directories(&self) -> Vec<(Descriptor, String)> {
        self.filesystem
            .iter()
            .map(|filesystem| (filesystem.root(), PREOPEN_NAME.to_string()))
            .collect()
    }

    /// Stream failures carry no filesystem error code.
    pub fn filesystem_error_code(&self, _error: &StreamError) -> Option<ErrorCode> {
        None
    }

    pub fn filesystem(&self) -> Option<&Filesystem> {
        self.filesystem.as_ref()
    }

    pub fn random(&mut self) -> &mut SeededRandom {
        &mut self.random
    }

    pub fn monotonic_clock(&self) -> &MonotonicClock {
        &self.monotonic_clock
    }

    pub fn wall_clock(&self) -> &WallClock {
        &self.wall_clock
    }

    pub fn command_line(&self) -> &CommandLine {
        &self.command_line
    }

    pub fn stdout(&mut self) -> &mut TerminalOutput {
        &mut self.stdout
    }

    pub fn stderr(&mut self) -> &mut TerminalOutput {
        &mut self.stderr
    }

    /// Flushes both terminals and produces the signal that ends the run.
    pub fn exit(&mut self, status: Result<(), ()>) -> ExitSignal {
        self.stdout.flush();
        self.stderr.flush();
        process::exit(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::{
        DescriptorFlags, EntryKind, OpenFlags, PathFlags, TreeMap, TreeNode,
    };

    fn config_with_root() -> EnvironmentConfig {
        let mut tree = TreeMap::new();
        tree.insert("a.txt".to_string(), TreeNode::Text("hi".to_string()));
        EnvironmentConfig {
            seed: 5,
            arguments: vec!["prog".to_string()],
            filesystem: Some(tree),
            ..Default::default()
        }
    }

    #[test]
    fn without_root_no_directories_are_preopened() {
        let environment = Environment::default();
        assert!(environment.get_directories().is_empty());
        assert!(environment.filesystem().is_none());
    }

    #[test]
    fn root_is_preopened_as_slash() {
        let environment = Environment::new(config_with_root());
        let directories = environment.get_directories();
        assert_eq!(directories.len(), 1);
        let (root, name) = &directories[0];
        assert_eq!(name, "/");
        assert_eq!(root.get_type(), Ok(EntryKind::Directory));
        assert_eq!(root.stat_at(PathFlags::empty(), "a.txt").unwrap().size, 2);
    }

    #[test]
    fn preopened_descriptors_share_one_tree() {
        let environment = Environment::new(config_with_root());
        let (first, _) = environment.get_directories().remove(0);
        let (second, _) = environment.get_directories().remove(0);
        first
            .open_at(
                PathFlags::empty(),
                "new.txt",
                OpenFlags::CREATE,
                DescriptorFlags::WRITE,
            )
            .unwrap();
        assert!(second.stat_at(PathFlags::empty(), "new.txt").is_ok());
        assert!(first.is_same_object(&second));
    }

    #[test]
    fn environments_do_not_interfere() {
        let mut first = Environment::new(config_with_root());
        let mut second = Environment::new(config_with_root());

        let (root, _) = first.get_directories().remove(0);
        root.unlink_file_at("a.txt").unwrap();
        let (other_root, _) = second.get_directories().remove(0);
        assert!(other_root.stat_at(PathFlags::empty(), "a.txt").is_ok());

        assert_eq!(
            first.random().get_random_bytes(16),
            second.random().get_random_bytes(16)
        );
        first.stdout().write(b"only first\n");
        assert!(second.stdout().lines().is_empty());
    }

    #[test]
    fn filesystem_error_code_is_unmapped() {
        let environment = Environment::default();
        assert_eq!(environment.filesystem_error_code(&StreamError::Closed), None);
    }

    #[test]
    fn exposes_command_line() {
        let environment = Environment::new(config_with_root());
        assert_eq!(environment.command_line().get_arguments(), ["prog"]);
        assert!(environment.command_line().get_environment().is_empty());
    }

    #[test]
    fn exit_flushes_terminals() {
        let mut environment = Environment::default();
        environment.stdout().write(b"partial");
        let signal = environment.exit(Err(()));
        assert_eq!(signal.code, 1);
        assert_eq!(environment.stdout().lines(), ["partial"]);
    }

    #[test]
    fn clocks_are_available() {
        let environment = Environment::default();
        let before = environment.monotonic_clock().now();
        assert!(environment.monotonic_clock().now() >= before);
        assert!(environment.wall_clock().now().seconds > 0);
    }
}
