//! Filter command implementation.
//!
//! The `secret-mask filter` command masks secrets in stdin and writes the
//! result to stdout, e.g. `make deploy 2>&1 | secret-mask filter`.

use std::io::{self, Read, Write};

use crate::cli::args::FilterArgs;
use crate::error::Result;

use super::dispatcher::{Command, CommandResult, GlobalOptions};
use super::setup::MaskingSetup;

/// The filter command implementation.
pub struct FilterCommand {
    options: GlobalOptions,
    args: FilterArgs,
}

impl FilterCommand {
    /// Create a new filter command.
    pub fn new(options: GlobalOptions, args: FilterArgs) -> Self {
        Self { options, args }
    }

    /// Copy `input` to `output`, masking the resolved secrets.
    pub fn filter<R, W>(&self, setup: &MaskingSetup, mut input: R, output: W) -> Result<u64>
    where
        R: Read,
        W: Write + Send + 'static,
    {
        let masker = setup.masker()?;
        let mut writer = masker.new_writer(output);
        masker.spawn()?;

        let copied = io::copy(&mut input, &mut writer);
        drop(writer);
        let closed = masker.close();
        let copied = copied?;
        closed?;

        tracing::debug!(bytes = copied, "filtered input");
        Ok(copied)
    }
}

impl Command for FilterCommand {
    fn execute(&self) -> Result<CommandResult> {
        let setup = MaskingSetup::resolve(&self.options, &self.args.masking)?;
        setup.warn_if_empty(self.options.quiet);

        self.filter(&setup, io::stdin().lock(), io::stdout())?;
        Ok(CommandResult::success())
    }
}
