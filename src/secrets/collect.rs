//! Collecting secret values to register with the masker.

use std::collections::{BTreeMap, HashSet};

use super::pattern::SecretMatcher;

/// Ordered, de-duplicated set of secret values.
///
/// Values that are empty or shorter than the configured minimum length are
/// ignored; masking every `1` or `true` in the output would make it useless.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use secret_mask::secrets::{SecretMatcher, SecretSet};
///
/// let mut env = BTreeMap::new();
/// env.insert("GITHUB_TOKEN".to_string(), "ghp_abc123".to_string());
/// env.insert("HOME".to_string(), "/home/dev".to_string());
///
/// let mut secrets = SecretSet::new(1);
/// secrets.add_detected(&SecretMatcher::with_builtins(), &env);
///
/// assert_eq!(secrets.len(), 1);
/// assert_eq!(secrets.patterns(), vec![b"ghp_abc123".to_vec()]);
/// ```
pub struct SecretSet {
    values: Vec<String>,
    seen: HashSet<String>,
    min_length: usize,
}

impl SecretSet {
    /// Create an empty set that ignores values shorter than `min_length` bytes.
    pub fn new(min_length: usize) -> Self {
        Self {
            values: Vec::new(),
            seen: HashSet::new(),
            min_length: min_length.max(1),
        }
    }

    /// Register a single value. Returns whether it was added.
    pub fn add(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.len() < self.min_length || self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.values.push(value);
        true
    }

    /// Register the values of explicitly named variables.
    ///
    /// Names missing from `env` are logged and skipped.
    pub fn add_named(&mut self, names: &[String], env: &BTreeMap<String, String>) -> usize {
        let mut added = 0;
        for name in names {
            match env.get(name) {
                Some(value) => {
                    if self.add(value.as_str()) {
                        added += 1;
                    }
                }
                None => tracing::warn!(name = %name, "secret variable is not set"),
            }
        }
        added
    }

    /// Register the values of every variable whose name looks secret.
    pub fn add_detected(
        &mut self,
        matcher: &SecretMatcher,
        env: &BTreeMap<String, String>,
    ) -> usize {
        let mut added = 0;
        for (name, value) in env {
            if let Some(pattern) = matcher.matching_pattern(name) {
                if self.add(value.as_str()) {
                    tracing::debug!(name = %name, pattern, "detected secret variable");
                    added += 1;
                }
            }
        }
        added
    }

    /// Register every value of an env file: all of them are injected into
    /// the child, so all of them are treated as secret.
    pub fn add_all_values(&mut self, vars: &BTreeMap<String, String>) -> usize {
        vars.values().filter(|v| self.add(v.as_str())).count()
    }

    /// Number of registered values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value is registered.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The registered values as masker patterns, in registration order.
    pub fn patterns(&self) -> Vec<Vec<u8>> {
        self.values.iter().map(|v| v.as_bytes().to_vec()).collect()
    }
}

impl std::fmt::Debug for SecretSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretSet")
            .field("len", &self.values.len())
            .field("min_length", &self.min_length)
            .finish()
    }
}

/// Snapshot of the process environment, skipping non-UTF-8 entries.
pub fn process_env() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}
