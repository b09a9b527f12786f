//! Run command implementation.
//!
//! The `secret-mask run -- <command>` command executes a child process and
//! masks secrets in its stdout and stderr.

use std::io;

use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::shell::{execute_masked, execute_plain, CommandSpec};

use super::dispatcher::{Command, CommandResult, GlobalOptions};
use super::setup::MaskingSetup;

/// The run command implementation.
pub struct RunCommand {
    options: GlobalOptions,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(options: GlobalOptions, args: RunArgs) -> Self {
        Self { options, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn command_spec(&self, setup: &MaskingSetup) -> CommandSpec {
        let (program, rest) = match self.args.command.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => (String::new(), Vec::new()),
        };

        let mut spec = CommandSpec::new(program, rest);
        spec.env = setup.env_file_vars.clone();
        spec.cwd = Some(self.options.working_dir.clone());
        spec
    }
}

impl Command for RunCommand {
    fn execute(&self) -> Result<CommandResult> {
        let setup = MaskingSetup::resolve(&self.options, &self.args.masking)?;
        let spec = self.command_spec(&setup);

        if self.args.no_masking {
            tracing::debug!(command = %spec.display(), "running without masking");
            let result = execute_plain(&spec)?;
            return Ok(CommandResult::from_exit_code(result.propagated_code()));
        }

        setup.warn_if_empty(self.options.quiet);

        let masker = setup.masker()?;
        let stdout = masker.new_writer(io::stdout());
        let stderr = masker.new_writer(io::stderr());
        masker.spawn()?;

        let result = execute_masked(&spec, stdout, stderr);
        // Close before reporting so nothing the child printed is lost.
        let closed = masker.close();
        let result = result?;
        closed?;

        Ok(CommandResult::from_exit_code(result.propagated_code()))
    }
}
