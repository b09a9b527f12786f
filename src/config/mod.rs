//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions and CLI overrides in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//! - `.env` file parsing in [`env_file`]
//!
//! # Example
//!
//! ```
//! use secret_mask::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".secret-mask.yml"), "mask: '<hidden>'").unwrap();
//!
//! let config = load_config(None, temp.path()).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.mask, "<hidden>");
//! ```
//!
//! # Precedence
//!
//! 1. Built-in defaults
//! 2. `--config <path>`, or `.secret-mask.yml` in the working directory
//! 3. `SECRET_MASK_*` environment variables and command-line flags

pub mod env_file;
pub mod loader;
pub mod schema;
pub mod validator;

pub use env_file::EnvFileParser;
pub use loader::{find_config, load_config, load_config_file, parse_config, CONFIG_FILE_NAME};
pub use schema::{ConfigOverrides, MaskConfig, DEFAULT_MASK};
pub use validator::{validate, validate_config, ValidationError};
