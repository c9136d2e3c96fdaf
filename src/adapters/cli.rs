// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line override configuration source adapter.
//!
//! Overrides are given as `namespace:key=value` pairs, typically collected from
//! repeated `--config` flags.

use crate::domain::{ConfigKey, ConfigValue, Result, StackError};
use crate::ports::ConfigSource;
use std::collections::HashMap;

/// Configuration source adapter for command-line overrides.
///
/// Only the first `=` splits key from value, so values may themselves contain
/// `=`. Later pairs for the same key replace earlier ones.
///
/// # Priority
///
/// Command-line overrides have the highest priority (3).
///
/// # Examples
///
/// ```rust
/// use stackcfg::adapters::CommandLineAdapter;
/// use stackcfg::ports::ConfigSource;
///
/// let adapter = CommandLineAdapter::from_pairs(vec!["vpc:nat_strategy=single"]).unwrap();
/// assert_eq!(adapter.get_str("vpc:nat_strategy").unwrap().unwrap().as_str(), "single");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandLineAdapter {
    values: HashMap<String, String>,
}

impl CommandLineAdapter {
    /// Creates an adapter with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter from `key=value` pairs.
    ///
    /// A pair without `=` or with an empty key is a `ParseError`.
    pub fn from_pairs<S: AsRef<str>>(pairs: Vec<S>) -> Result<Self> {
        let mut adapter = Self::new();
        for pair in &pairs {
            let (key, value) = Self::parse_pair(pair.as_ref())?;
            adapter.values.insert(key, value);
        }
        Ok(adapter)
    }

    /// Splits one `key=value` pair.
    pub fn parse_pair(pair: &str) -> Result<(String, String)> {
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(StackError::ParseError {
                message: format!("Invalid override '{}', expected <namespace:key>=<value>", pair),
                source: None,
            }),
        }
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no overrides were given.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for CommandLineAdapter {
    fn name(&self) -> &str {
        "cli"
    }

    fn priority(&self) -> u8 {
        3
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self
            .values
            .get(key.as_str())
            .map(|v| ConfigValue::from(v.as_str())))
    }

    fn all_keys(&self) -> Result<Vec<ConfigKey>> {
        Ok(self
            .values
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }
}
