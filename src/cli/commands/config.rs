//! Config command implementation.
//!
//! The `secret-mask config` command shows the resolved configuration and
//! how many secrets it registers. Secret values are never printed.

use serde::Serialize;

use crate::cli::args::ConfigArgs;
use crate::config::MaskConfig;
use crate::error::{MaskError, Result};

use super::dispatcher::{Command, CommandResult, GlobalOptions};
use super::setup::MaskingSetup;

/// The config command implementation.
pub struct ConfigCommand {
    options: GlobalOptions,
    args: ConfigArgs,
}

#[derive(Serialize)]
struct ResolvedConfig<'a> {
    source: Option<String>,
    secret_count: usize,
    config: &'a MaskConfig,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(options: GlobalOptions, args: ConfigArgs) -> Self {
        Self { options, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }

    /// Render the resolved configuration as YAML or JSON.
    pub fn render(&self, setup: &MaskingSetup) -> Result<String> {
        if self.args.json {
            let resolved = ResolvedConfig {
                source: setup.source.as_ref().map(|p| p.display().to_string()),
                secret_count: setup.secrets.len(),
                config: &setup.config,
            };
            return serde_json::to_string_pretty(&resolved).map_err(|e| MaskError::Other(e.into()));
        }

        let mut out = String::new();
        match &setup.source {
            Some(path) => out.push_str(&format!("# {}\n", path.display())),
            None => out.push_str("# defaults (no config file)\n"),
        }
        out.push_str(&format!("# {} secret(s) registered\n", setup.secrets.len()));
        let yaml = serde_yaml::to_string(&setup.config).map_err(|e| MaskError::Other(e.into()))?;
        out.push_str(&yaml);
        Ok(out)
    }
}

impl Command for ConfigCommand {
    fn execute(&self) -> Result<CommandResult> {
        let setup = MaskingSetup::resolve(&self.options, &self.args.masking)?;
        print!("{}", self.render(&setup)?);
        if self.args.json {
            println!();
        }
        Ok(CommandResult::success())
    }
}
