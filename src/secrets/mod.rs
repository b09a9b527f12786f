//! Secret discovery.
//!
//! This module decides *which* values the masker should redact:
//!
//! - [`SecretMatcher`] - Flags environment variable names that hold secrets
//! - [`SecretSet`] - Collects and de-duplicates the secret values themselves
//! - [`BUILTIN_PATTERNS`] - Built-in name patterns for common secrets
//!
//! # Example
//!
//! ```
//! use secret_mask::secrets::SecretMatcher;
//!
//! let matcher = SecretMatcher::with_builtins();
//! assert!(matcher.is_secret("API_KEY"));
//! assert!(matcher.is_secret("DATABASE_URL"));
//! assert!(!matcher.is_secret("PATH"));
//! ```

pub mod collect;
pub mod pattern;

pub use collect::{process_env, SecretSet};
pub use pattern::{SecretMatcher, SecretPattern, BUILTIN_PATTERNS};
