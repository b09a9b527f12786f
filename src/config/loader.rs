//! Configuration file discovery and loading.

use crate::config::schema::MaskConfig;
use crate::error::{MaskError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".secret-mask.yml";

/// Find `.secret-mask.yml` in `dir`.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Resolve the configuration for a run.
///
/// An explicit path must exist. Without one, `.secret-mask.yml` in `dir` is
/// used when present, otherwise the defaults.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<MaskConfig> {
    match explicit {
        Some(path) => load_config_file(path),
        None => match find_config(dir) {
            Some(path) => load_config_file(&path),
            None => {
                tracing::debug!(dir = %dir.display(), "no config file found, using defaults");
                Ok(MaskConfig::default())
            }
        },
    }
}

/// Load and parse a single config file.
pub fn load_config_file(path: &Path) -> Result<MaskConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MaskError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MaskError::Io(e)
        }
    })?;

    tracing::debug!(path = %path.display(), "loading config");
    parse_config(&content, path)
}

/// Parse YAML content into a [`MaskConfig`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<MaskConfig> {
    if content.trim().is_empty() {
        return Ok(MaskConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| MaskError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}
