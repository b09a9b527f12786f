//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::error::Result;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Mirror a child's exit code.
    pub fn from_exit_code(exit_code: i32) -> Self {
        Self {
            success: exit_code == 0,
            exit_code,
        }
    }
}

/// Settings shared by every command, taken from global flags.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Directory used for config discovery and relative paths.
    pub working_dir: PathBuf,

    /// Explicit config file, if given.
    pub config_path: Option<PathBuf>,

    /// Suppress informational messages.
    pub quiet: bool,
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    options: GlobalOptions,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given working directory.
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            options: GlobalOptions {
                working_dir,
                config_path: None,
                quiet: false,
            },
        }
    }

    /// Create a dispatcher taking global flags from the parsed CLI.
    pub fn from_cli(working_dir: PathBuf, cli: &Cli) -> Self {
        Self {
            options: GlobalOptions {
                working_dir,
                config_path: cli.config.clone(),
                quiet: cli.quiet,
            },
        }
    }

    /// Get the working directory.
    pub fn working_dir(&self) -> &Path {
        &self.options.working_dir
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli) -> Result<CommandResult> {
        match &cli.command {
            Commands::Run(args) => {
                let cmd = super::run::RunCommand::new(self.options.clone(), args.clone());
                cmd.execute()
            }
            Commands::Filter(args) => {
                let cmd = super::filter::FilterCommand::new(self.options.clone(), args.clone());
                cmd.execute()
            }
            Commands::Config(args) => {
                let cmd = super::config::ConfigCommand::new(self.options.clone(), args.clone());
                cmd.execute()
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute()
            }
        }
    }
}
