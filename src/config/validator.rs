//! Configuration validation rules.
//!
//! - The mask must not be empty
//! - `secret_env` entries must be valid variable names
//! - `min_secret_length` must be at least 1

use crate::config::schema::MaskConfig;
use crate::error::{MaskError, Result};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &MaskConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.mask.is_empty() {
        errors.push(ValidationError {
            rule: "empty-mask".to_string(),
            message: "'mask' must not be empty; secrets would silently disappear".to_string(),
        });
    }

    for name in &config.secret_env {
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            errors.push(ValidationError {
                rule: "invalid-env-name".to_string(),
                message: format!("'{}' in 'secret_env' is not a valid variable name", name),
            });
        }
    }

    if config.min_secret_length == 0 {
        errors.push(ValidationError {
            rule: "min-secret-length".to_string(),
            message: "'min_secret_length' must be at least 1".to_string(),
        });
    }

    errors
}

/// Validate configuration, returning the first batch of errors as one.
pub fn validate(config: &MaskConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(MaskError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
