//! Resolving configuration and secrets shared by the masking commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::args::MaskingArgs;
use crate::config::{load_config, validate, EnvFileParser, MaskConfig};
use crate::error::Result;
use crate::masker::Masker;
use crate::secrets::{process_env, SecretMatcher, SecretSet};

use super::dispatcher::GlobalOptions;

/// Everything a command needs to build a masker.
#[derive(Debug)]
pub struct MaskingSetup {
    /// Resolved configuration, file values with overrides applied.
    pub config: MaskConfig,

    /// Config file the values came from, if any.
    pub source: Option<PathBuf>,

    /// Variables read from the configured env file.
    pub env_file_vars: BTreeMap<String, String>,

    /// Secret values to mask.
    pub secrets: SecretSet,
}

impl MaskingSetup {
    /// Resolve config and secrets against the current process environment.
    pub fn resolve(options: &GlobalOptions, args: &MaskingArgs) -> Result<Self> {
        Self::resolve_with_env(options, args, process_env())
    }

    /// Resolve config and secrets against an explicit environment.
    pub fn resolve_with_env(
        options: &GlobalOptions,
        args: &MaskingArgs,
        mut env: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut config = load_config(options.config_path.as_deref(), &options.working_dir)?;
        let source = match &options.config_path {
            Some(path) => Some(path.clone()),
            None => crate::config::find_config(&options.working_dir),
        };
        args.overrides().apply(&mut config);
        validate(&config)?;

        let env_file_vars = match &config.env_file {
            Some(path) => {
                let path = options.working_dir.join(path);
                tracing::debug!(path = %path.display(), "loading env file");
                EnvFileParser::load(&path)?
            }
            None => BTreeMap::new(),
        };

        let mut secrets = SecretSet::new(config.min_secret_length);
        secrets.add_all_values(&env_file_vars);

        // Env file values shadow inherited ones, as they do for the child.
        env.extend(env_file_vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        secrets.add_named(&config.secret_env, &env);
        if config.detect_secret_env {
            secrets.add_detected(&SecretMatcher::with_builtins(), &env);
        }

        tracing::debug!(secrets = secrets.len(), "resolved secrets");

        Ok(Self {
            config,
            source,
            env_file_vars,
            secrets,
        })
    }

    /// Build a masker for the resolved secrets.
    pub fn masker(&self) -> Result<Masker> {
        Masker::new(
            self.secrets.patterns(),
            &self.config.mask,
            self.config.masking_timeout(),
        )
    }

    /// Print a hint when nothing would be masked.
    pub fn warn_if_empty(&self, quiet: bool) {
        if quiet || !self.secrets.is_empty() {
            return;
        }
        eprintln!(
            "{} no secrets registered; output is passed through unchanged",
            console::style("warning:").yellow().bold()
        );
    }
}
