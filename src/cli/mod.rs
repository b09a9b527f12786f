//! Command-line interface for secret-mask.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, ConfigArgs, FilterArgs, MaskingArgs, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult, GlobalOptions, MaskingSetup};
