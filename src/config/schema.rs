//! Configuration schema definitions.
//!
//! This module contains the struct that maps to the `.secret-mask.yml`
//! file format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default replacement for masked secrets.
pub const DEFAULT_MASK: &str = "[REDACTED]";

/// Root configuration structure for `.secret-mask.yml`.
///
/// # Example
///
/// ```
/// use secret_mask::config::MaskConfig;
///
/// let config: MaskConfig = serde_yaml::from_str(r#"
/// mask: "<redacted>"
/// masking_timeout_ms: 250
/// secret_env:
///   - DEPLOY_KEY
/// "#).unwrap();
///
/// assert_eq!(config.mask, "<redacted>");
/// assert_eq!(config.masking_timeout().as_millis(), 250);
/// assert!(config.detect_secret_env);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskConfig {
    /// Text written in place of every masked secret
    pub mask: String,

    /// Milliseconds of producer silence before a partial match is released
    pub masking_timeout_ms: u64,

    /// Environment variables whose values are always masked
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secret_env: Vec<String>,

    /// Also mask variables whose names look secret (API_KEY, *_TOKEN, ...)
    pub detect_secret_env: bool,

    /// Env file injected into `run` children; all its values are masked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,

    /// Values shorter than this many bytes are never masked
    pub min_secret_length: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            mask: DEFAULT_MASK.to_string(),
            masking_timeout_ms: default_masking_timeout_ms(),
            secret_env: Vec::new(),
            detect_secret_env: true,
            env_file: None,
            min_secret_length: 1,
        }
    }
}

impl MaskConfig {
    /// The masking timeout as a [`Duration`].
    pub fn masking_timeout(&self) -> Duration {
        Duration::from_millis(self.masking_timeout_ms)
    }
}

fn default_masking_timeout_ms() -> u64 {
    1000
}

/// Values given on the command line or through `SECRET_MASK_*` variables.
///
/// `None` and empty lists leave the file value untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub mask: Option<String>,
    pub masking_timeout_ms: Option<u64>,
    pub secret_env: Vec<String>,
    pub detect_secret_env: Option<bool>,
    pub env_file: Option<PathBuf>,
    pub min_secret_length: Option<usize>,
}

impl ConfigOverrides {
    /// Layer these overrides on top of `config`.
    ///
    /// Scalars replace; `secret_env` names are appended.
    pub fn apply(self, config: &mut MaskConfig) {
        if let Some(mask) = self.mask {
            config.mask = mask;
        }
        if let Some(ms) = self.masking_timeout_ms {
            config.masking_timeout_ms = ms;
        }
        for name in self.secret_env {
            if !config.secret_env.contains(&name) {
                config.secret_env.push(name);
            }
        }
        if let Some(detect) = self.detect_secret_env {
            config.detect_secret_env = detect;
        }
        if let Some(path) = self.env_file {
            config.env_file = Some(path);
        }
        if let Some(len) = self.min_secret_length {
            config.min_secret_length = len;
        }
    }
}
