//! secret-mask - Keep secrets out of command output.
//!
//! The core of the crate is [`masker`], a streaming filter that replaces
//! every occurrence of a set of secret byte strings with a fixed mask while
//! forwarding everything else unchanged. Secrets split across arbitrary
//! write boundaries are still caught, and partially matched output is
//! released after a short period of producer silence.
//!
//! # Modules
//!
//! - [`masker`] - Streaming pattern matching and the masking writer
//! - [`secrets`] - Deciding which environment values are secret
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`shell`] - Running child processes with masked output
//! - [`cli`] - Command-line interface and argument parsing
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use std::time::Duration;
//! use secret_mask::masker::Masker;
//!
//! let masker = Masker::new(["hunter2"], "***", Duration::from_millis(100)).unwrap();
//! let out = tempfile::NamedTempFile::new().unwrap();
//! let mut writer = masker.new_writer(out.reopen().unwrap());
//! masker.spawn().unwrap();
//!
//! writer.write_all(b"password: hun").unwrap();
//! writer.write_all(b"ter2\n").unwrap();
//! masker.close().unwrap();
//!
//! assert_eq!(std::fs::read_to_string(out.path()).unwrap(), "password: ***\n");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod masker;
pub mod secrets;
pub mod shell;

pub use error::{MaskError, Result};
