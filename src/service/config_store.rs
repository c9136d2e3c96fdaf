// SPDX-License-Identifier: MIT OR Apache-2.0

//! Priority-ordered explicit configuration store.
//!
//! This module aggregates several `ConfigSource`s into the single explicit
//! channel the resolver reads from.

use crate::domain::{ConfigKey, ConfigStore, ConfigValue, Result};
use crate::ports::ConfigSource;
use std::collections::BTreeMap;

/// Explicit configuration channel backed by multiple sources.
///
/// Sources are queried in priority order (highest first) and the first value
/// found is returned. A failing source aborts the lookup instead of falling
/// through to a lower-priority one.
///
/// # Examples
///
/// ```rust
/// use stackcfg::domain::ConfigStore;
/// use stackcfg::service::StackConfigStore;
///
/// # fn main() -> stackcfg::domain::Result<()> {
/// let store = StackConfigStore::builder()
///     .with_cli_overrides(vec!["vpc:nat_strategy=single"])?
///     .build();
///
/// assert_eq!(store.get_str("vpc:nat_strategy")?.unwrap().as_str(), "single");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct StackConfigStore {
    /// Sources, maintained in priority order (highest first)
    sources: Vec<Box<dyn ConfigSource>>,
}

impl StackConfigStore {
    /// Creates a store with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store builder.
    pub fn builder() -> StackConfigStoreBuilder {
        StackConfigStoreBuilder::new()
    }

    /// Adds a source; sources are re-sorted by priority.
    pub fn add_source(&mut self, source: Box<dyn ConfigSource>) {
        tracing::debug!(
            "Adding configuration source '{}' (priority {})",
            source.name(),
            source.priority()
        );
        self.sources.push(source);
        self.sort_sources();
    }

    /// Names of the sources, highest priority first.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Every explicitly set key with its winning value and source name.
    pub fn explicit_values(&self) -> Result<BTreeMap<ConfigKey, (ConfigValue, String)>> {
        let mut values = BTreeMap::new();
        // Lowest priority first so higher ones overwrite.
        for source in self.sources.iter().rev() {
            for key in source.all_keys()? {
                if let Some(value) = source.get(&key)? {
                    values.insert(key, (value, source.name().to_string()));
                }
            }
        }
        Ok(values)
    }

    /// Sorts sources by priority (highest first).
    fn sort_sources(&mut self) {
        self.sources.sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }
}

impl ConfigStore for StackConfigStore {
    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        for source in &self.sources {
            if let Some(value) = source.get(key)? {
                tracing::debug!("Key '{}' set by source '{}'", key, source.name());
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

/// Builder for constructing a `StackConfigStore`.
#[derive(Default)]
pub struct StackConfigStoreBuilder {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl StackConfigStoreBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a configuration source.
    pub fn with_source(mut self, source: Box<dyn ConfigSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds the process environment with the `STACKCFG_` prefix.
    #[cfg(feature = "env")]
    pub fn with_env_vars(self) -> Self {
        use crate::adapters::EnvVarAdapter;
        self.with_source(Box::new(EnvVarAdapter::new()))
    }

    /// Adds the process environment with a custom prefix.
    #[cfg(feature = "env")]
    pub fn with_env_prefix(self, prefix: impl Into<String>) -> Self {
        use crate::adapters::EnvVarAdapter;
        self.with_source(Box::new(EnvVarAdapter::with_prefix(prefix)))
    }

    /// Adds `key=value` command-line overrides.
    #[cfg(feature = "cli")]
    pub fn with_cli_overrides<S: AsRef<str>>(self, pairs: Vec<S>) -> Result<Self> {
        use crate::adapters::CommandLineAdapter;
        let adapter = CommandLineAdapter::from_pairs(pairs)?;
        Ok(self.with_source(Box::new(adapter)))
    }

    /// Adds a stack file.
    #[cfg(feature = "yaml")]
    pub fn with_stack_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        use crate::adapters::YamlFileAdapter;
        let adapter = YamlFileAdapter::from_file(path)?;
        Ok(self.with_source(Box::new(adapter)))
    }

    /// Adds `Pulumi.<stack>.yaml` from `dir` when that file exists.
    #[cfg(feature = "yaml")]
    pub fn with_discovered_stack_file(
        self,
        dir: impl AsRef<std::path::Path>,
        stack: &crate::domain::StackIdentifier,
    ) -> Result<Self> {
        use crate::adapters::YamlFileAdapter;
        Ok(match YamlFileAdapter::discover(dir, stack)? {
            Some(adapter) => self.with_source(Box::new(adapter)),
            None => self,
        })
    }

    /// Builds the store.
    pub fn build(self) -> StackConfigStore {
        let mut store = StackConfigStore::new();
        for source in self.sources {
            store.add_source(source);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StackError;
    use std::collections::HashMap;

    struct MockSource {
        name: String,
        priority: u8,
        values: HashMap<String, String>,
        failing: bool,
    }

    impl MockSource {
        fn new(name: &str, priority: u8) -> Self {
            Self {
                name: name.to_string(),
                priority,
                values: HashMap::new(),
                failing: false,
            }
        }

        fn with_value(mut self, key: &str, value: &str) -> Self {
            self.values.insert(key.to_string(), value.to_string());
            self
        }

        fn failing(mut self) -> Self {
            self.failing = true;
            self
        }
    }

    impl ConfigSource for MockSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
            if self.failing {
                return Err(StackError::SourceError {
                    source_name: self.name.clone(),
                    message: "backend unavailable".to_string(),
                    source: None,
                });
            }
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

    #[test]
    fn test_store_priority_order() {
        let mut store = StackConfigStore::new();
        store.add_source(Box::new(MockSource::new("low", 1)));
        store.add_source(Box::new(MockSource::new("high", 3)));
        store.add_source(Box::new(MockSource::new("medium", 2)));

        assert_eq!(store.source_names(), vec!["high", "medium", "low"]);
    }

    #[test]
    fn test_store_get_precedence() {
        let store = StackConfigStore::builder()
            .with_source(Box::new(MockSource::new("low", 1).with_value("k:v", "low")))
            .with_source(Box::new(MockSource::new("high", 3).with_value("k:v", "high")))
            .with_source(Box::new(MockSource::new("medium", 2).with_value("k:v", "medium")))
            .build();

        assert_eq!(store.get_str("k:v").unwrap().unwrap().as_str(), "high");
    }

    #[test]
    fn test_store_falls_through_to_lower_priority() {
        let store = StackConfigStore::builder()
            .with_source(Box::new(MockSource::new("low", 1).with_value("k:only_low", "x")))
            .with_source(Box::new(MockSource::new("high", 3)))
            .build();

        assert_eq!(store.get_str("k:only_low").unwrap().unwrap().as_str(), "x");
        assert!(store.get_str("k:missing").unwrap().is_none());
        assert!(!store.has(&ConfigKey::from("k:missing")).unwrap());
    }

    #[test]
    fn test_store_propagates_source_errors() {
        let store = StackConfigStore::builder()
            .with_source(Box::new(MockSource::new("broken", 3).failing()))
            .with_source(Box::new(MockSource::new("low", 1).with_value("k:v", "x")))
            .build();

        assert!(matches!(
            store.get_str("k:v"),
            Err(StackError::SourceError { .. })
        ));
    }

    #[test]
    fn test_explicit_values_reports_winner() {
        let store = StackConfigStore::builder()
            .with_source(Box::new(
                MockSource::new("file", 1)
                    .with_value("vpc:name", "from-file")
                    .with_value("aws:region", "eu-west-1"),
            ))
            .with_source(Box::new(MockSource::new("cli", 3).with_value("vpc:name", "from-cli")))
            .build();

        let values = store.explicit_values().unwrap();
        let (value, source) = &values[&ConfigKey::from("vpc:name")];
        assert_eq!(value.as_str(), "from-cli");
        assert_eq!(source, "cli");
        assert_eq!(values[&ConfigKey::from("aws:region")].1, "file");
    }

    #[test]
    fn test_empty_store() {
        let store = StackConfigStore::default();
        assert!(store.source_names().is_empty());
        assert!(store.get_str("vpc:name").unwrap().is_none());
    }

    #[test]
    #[cfg(feature = "cli")]
    fn test_builder_rejects_bad_override() {
        assert!(StackConfigStore::builder()
            .with_cli_overrides(vec!["no-equals-sign"])
            .is_err());
    }
}
