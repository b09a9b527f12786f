//! Secret environment variable detection.
//!
//! Decides from a variable's *name* whether its value should be treated as a
//! secret and registered with the masker.

use regex::Regex;

/// A named rule that flags environment variable names as secret.
#[derive(Debug, Clone)]
pub struct SecretPattern {
    /// Name of this pattern (for debugging).
    pub name: String,
    /// Regex matched against environment variable names.
    pub env_pattern: Regex,
}

/// Built-in patterns for common secrets.
///
/// Each tuple contains (name, regex_pattern).
pub const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    ("api_key", r"(?i)^.*_?(API_?KEY|APIKEY)$"),
    ("secret", r"(?i)^.*_?(SECRET|SECRET_KEY|CLIENT_SECRET)$"),
    ("token", r"(?i)^.*_?(TOKEN|ACCESS_TOKEN|AUTH_TOKEN|REFRESH_TOKEN)$"),
    ("password", r"(?i)^.*_?(PASSWORD|PASSWD|PWD)$"),
    ("credential", r"(?i)^.*_?CREDENTIALS?$"),
    ("private_key", r"(?i)^.*_?PRIVATE_KEY$"),
    (
        "connection_string",
        r"(?i)^.*(CONNECTION_STRING|DATABASE_URL)$",
    ),
];

/// Variables that match a built-in pattern but never hold a secret.
const NEVER_SECRET: &[&str] = &["PWD", "OLDPWD"];

/// Classifies environment variable names as secret or not.
///
/// # Example
///
/// ```
/// use secret_mask::secrets::SecretMatcher;
///
/// let matcher = SecretMatcher::with_builtins();
///
/// assert!(matcher.is_secret("GITHUB_TOKEN"));
/// assert!(matcher.is_secret("DB_PASSWORD"));
///
/// assert!(!matcher.is_secret("PATH"));
/// // The shell's working directory is not a password.
/// assert!(!matcher.is_secret("PWD"));
/// ```
#[derive(Debug, Clone)]
pub struct SecretMatcher {
    patterns: Vec<SecretPattern>,
}

impl SecretMatcher {
    /// Create a matcher with built-in patterns.
    pub fn with_builtins() -> Self {
        let patterns = BUILTIN_PATTERNS
            .iter()
            .filter_map(|(name, pattern)| {
                Regex::new(pattern).ok().map(|env_pattern| SecretPattern {
                    name: name.to_string(),
                    env_pattern,
                })
            })
            .collect();

        Self { patterns }
    }

    /// Create a matcher with custom patterns only.
    pub fn new(patterns: Vec<SecretPattern>) -> Self {
        Self { patterns }
    }

    /// Create a matcher with built-in patterns plus exact custom names.
    ///
    /// # Example
    ///
    /// ```
    /// use secret_mask::secrets::SecretMatcher;
    ///
    /// let custom = vec!["STRIPE_LIVE".to_string()];
    /// let matcher = SecretMatcher::with_builtins_and_custom(&custom);
    ///
    /// assert!(matcher.is_secret("STRIPE_LIVE"));
    /// assert!(matcher.is_secret("API_KEY"));
    /// ```
    pub fn with_builtins_and_custom(custom_names: &[String]) -> Self {
        let mut matcher = Self::with_builtins();

        for name in custom_names {
            if let Ok(pattern) = Regex::new(&format!("^{}$", regex::escape(name))) {
                matcher.add_pattern(SecretPattern {
                    name: format!("custom:{}", name),
                    env_pattern: pattern,
                });
            }
        }

        matcher
    }

    /// Add a custom pattern.
    pub fn add_pattern(&mut self, pattern: SecretPattern) {
        self.patterns.push(pattern);
    }

    /// Check if an environment variable name matches any secret pattern.
    pub fn is_secret(&self, env_name: &str) -> bool {
        if NEVER_SECRET.contains(&env_name) {
            return false;
        }
        self.patterns
            .iter()
            .any(|p| p.env_pattern.is_match(env_name))
    }

    /// Name of the first pattern that flags `env_name`, for diagnostics.
    pub fn matching_pattern(&self, env_name: &str) -> Option<&str> {
        if NEVER_SECRET.contains(&env_name) {
            return None;
        }
        self.patterns
            .iter()
            .find(|p| p.env_pattern.is_match(env_name))
            .map(|p| p.name.as_str())
    }

    /// Get all environment variable names that match secret patterns.
    pub fn find_secrets<'a>(&self, env_names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        env_names.filter(|name| self.is_secret(name)).collect()
    }

    /// Get the number of patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

impl Default for SecretMatcher {
    fn default() -> Self {
        Self::with_builtins()
    }
}
