//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// secret-mask - Keep secrets out of command output.
#[derive(Debug, Parser)]
#[command(name = "secret-mask")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ./.secret-mask.yml)
    #[arg(short, long, global = true, env = "SECRET_MASK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress informational messages on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a command with secrets masked in its stdout and stderr
    Run(RunArgs),

    /// Mask secrets in stdin and write the result to stdout
    Filter(FilterArgs),

    /// Show resolved configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options that decide what is masked and how.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct MaskingArgs {
    /// Text written in place of each secret
    #[arg(long, value_name = "TEXT", env = "SECRET_MASK_MASK")]
    pub mask: Option<String>,

    /// Milliseconds of silence before a partially matched secret is printed
    #[arg(long, value_name = "MS", env = "SECRET_MASK_TIMEOUT_MS")]
    pub masking_timeout: Option<u64>,

    /// Mask the value of this environment variable (repeatable, comma-separated)
    #[arg(short, long, value_name = "NAME", value_delimiter = ',')]
    pub secret_env: Vec<String>,

    /// Do not mask variables just because their name looks secret
    #[arg(long)]
    pub no_detect: bool,

    /// Env file whose values are masked (and injected for `run`)
    #[arg(long, value_name = "PATH", env = "SECRET_MASK_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Ignore secret values shorter than this many bytes
    #[arg(long, value_name = "BYTES")]
    pub min_secret_length: Option<usize>,
}

impl MaskingArgs {
    /// Convert flags into config overrides.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mask: self.mask.clone(),
            masking_timeout_ms: self.masking_timeout,
            secret_env: self.secret_env.clone(),
            detect_secret_env: self.no_detect.then_some(false),
            env_file: self.env_file.clone(),
            min_secret_length: self.min_secret_length,
        }
    }
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub masking: MaskingArgs,

    /// Pass output through untouched
    #[arg(long)]
    pub no_masking: bool,

    /// Command to run, followed by its arguments
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

/// Arguments for the `filter` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub masking: MaskingArgs,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub masking: MaskingArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
