//! secret-mask CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use secret_mask::cli::{Cli, CommandDispatcher};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
///
/// Logs go to stderr so they never mix with masked stdout.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("secret_mask=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("secret_mask=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!(command = ?cli.command, "secret-mask starting");

    let working_dir = std::env::current_dir().unwrap_or_default();
    let dispatcher = CommandDispatcher::from_cli(working_dir, &cli);

    match dispatcher.dispatch(&cli) {
        Ok(result) => ExitCode::from(u8::try_from(result.exit_code).unwrap_or(1)),
        Err(e) => {
            eprintln!("{} {}", console::style("Error:").red().bold(), e);
            ExitCode::from(1)
        }
    }
}
