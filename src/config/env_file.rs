//! .env file parsing.
//!
//! Variables from an env file are injected into the environment of a `run`
//! child, and every value is registered as a secret.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Parses `.env`-style files into a sorted map of variables.
///
/// # Supported Formats
///
/// - Simple: `KEY=value`
/// - Exported: `export KEY=value`
/// - Quoted: `KEY="value with spaces"` or `KEY='single quoted'`
/// - Empty: `KEY=`
/// - Comments: `# This is a comment`
/// - Values with equals signs: `URL=https://example.com?foo=bar`
///
/// # Example
///
/// ```
/// use secret_mask::config::EnvFileParser;
///
/// let content = r#"
/// ## Database config
/// export DATABASE_URL=postgres://localhost/db
/// API_KEY="abc 123"
/// "#;
///
/// let vars = EnvFileParser::parse(content).unwrap();
/// assert_eq!(vars.get("DATABASE_URL").map(String::as_str), Some("postgres://localhost/db"));
/// assert_eq!(vars.get("API_KEY").map(String::as_str), Some("abc 123"));
/// ```
pub struct EnvFileParser;

impl EnvFileParser {
    /// Parse env file content.
    ///
    /// Lines without `=` are rejected with their line number, since a
    /// half-parsed secrets file would leave values unmasked.
    pub fn parse(content: &str) -> Result<BTreeMap<String, String>> {
        let mut vars = BTreeMap::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = Self::parse_line(line)
                .with_context(|| format!("line {}: expected KEY=value", number + 1))?;
            vars.insert(key, value);
        }

        Ok(vars)
    }

    fn parse_line(line: &str) -> Option<(String, String)> {
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), Self::unquote(value.trim()).to_string()))
    }

    fn unquote(value: &str) -> &str {
        let quoted = value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')));
        if quoted {
            &value[1..value.len() - 1]
        } else {
            value
        }
    }

    /// Load and parse an env file from a path.
    pub fn load(path: &Path) -> Result<BTreeMap<String, String>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read env file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid env file {}", path.display()))
    }
}
