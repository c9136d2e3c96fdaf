// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable configuration source adapter.
//!
//! Variables carrying the adapter's prefix map onto namespaced keys: the prefix
//! is stripped, the rest is lowercased and a double underscore separates the
//! namespace from the name. With the default `STACKCFG_` prefix,
//! `STACKCFG_VPC__NAT_STRATEGY` sets `vpc:nat_strategy`.

use crate::domain::{ConfigKey, ConfigValue, Result};
use crate::ports::ConfigSource;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::env;

/// Default variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "STACKCFG_";

/// Separator between namespace and name inside a variable name.
const NAMESPACE_DELIMITER: &str = "__";

/// Maximum length for environment variable keys
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values
const MAX_ENV_VALUE_LEN: usize = 64 * 1024;

/// Configuration source adapter for environment variables.
///
/// # Priority
///
/// Environment variables have a priority of 2: they override the stack file (1)
/// and are overridden by command-line `--config` values (3).
///
/// # Examples
///
/// ```rust
/// use stackcfg::adapters::EnvVarAdapter;
/// use stackcfg::ports::ConfigSource;
/// use std::collections::HashMap;
///
/// let mut vars = HashMap::new();
/// vars.insert("STACKCFG_VPC__NAT_STRATEGY".to_string(), "single".to_string());
///
/// let adapter = EnvVarAdapter::with_vars(vars);
/// assert_eq!(adapter.get_str("vpc:nat_strategy").unwrap().unwrap().as_str(), "single");
/// ```
#[derive(Debug)]
pub struct EnvVarAdapter {
    prefix: String,
    /// Supplied variables; `None` reads the process environment
    vars: Option<HashMap<String, String>>,
    /// Translated keys, loaded on first access
    cache: OnceCell<HashMap<String, String>>,
}

impl EnvVarAdapter {
    /// Creates an adapter over the process environment with the default prefix.
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Creates an adapter over the process environment with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: None,
            cache: OnceCell::new(),
        }
    }

    /// Creates an adapter over a fixed set of raw variables, using the default
    /// prefix. Intended for tests and embedding.
    pub fn with_vars(vars: HashMap<String, String>) -> Self {
        Self {
            prefix: DEFAULT_ENV_PREFIX.to_string(),
            vars: Some(vars),
            cache: OnceCell::new(),
        }
    }

    /// Translates a variable name into a configuration key, if it is one.
    ///
    /// ```rust
    /// use stackcfg::adapters::EnvVarAdapter;
    ///
    /// let adapter = EnvVarAdapter::new();
    /// assert_eq!(adapter.key_for("STACKCFG_AWS__REGION").as_deref(), Some("aws:region"));
    /// assert_eq!(adapter.key_for("STACKCFG_LOG"), None);
    /// assert_eq!(adapter.key_for("HOME"), None);
    /// ```
    pub fn key_for(&self, var: &str) -> Option<String> {
        let rest = var.strip_prefix(&self.prefix)?;
        let (namespace, name) = rest.split_once(NAMESPACE_DELIMITER)?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some(ConfigKey::namespaced(&namespace.to_lowercase(), &name.to_lowercase()).into_string())
    }

    fn load(&self) -> HashMap<String, String> {
        let raw: Box<dyn Iterator<Item = (String, String)>> = match &self.vars {
            Some(vars) => Box::new(vars.clone().into_iter()),
            None => Box::new(env::vars_os().filter_map(|(var, value)| {
                match (var.into_string(), value.into_string()) {
                    (Ok(var), Ok(value)) => Some((var, value)),
                    (var, _) => {
                        tracing::debug!(
                            "Skipping non-UTF-8 environment variable {:?}",
                            var.unwrap_or_else(|os| os.to_string_lossy().into_owned())
                        );
                        None
                    }
                }
            })),
        };

        let mut values = HashMap::new();
        for (var, value) in raw {
            if var.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    "Skipping oversized environment variable: key_len={}, value_len={}",
                    var.len(),
                    value.len()
                );
                continue;
            }
            if let Some(key) = self.key_for(&var) {
                values.insert(key, value);
            }
        }

        tracing::debug!(
            "Loaded {} configuration values from environment (prefix={})",
            values.len(),
            self.prefix
        );
        values
    }

    fn values(&self) -> &HashMap<String, String> {
        self.cache.get_or_init(|| self.load())
    }
}

impl Default for EnvVarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvVarAdapter {
    fn name(&self) -> &str {
        "env"
    }

    fn priority(&self) -> u8 {
        2
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self
            .values()
            .get(key.as_str())
            .map(|v| ConfigValue::from(v.as_str())))
    }

    fn all_keys(&self) -> Result<Vec<ConfigKey>> {
        Ok(self
            .values()
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }
}
