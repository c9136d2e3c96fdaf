// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit configuration channel trait.
//!
//! The `ConfigStore` trait is the highest-precedence input to resolution: values
//! the operator set explicitly for a stack (stack file, environment variables,
//! command-line overrides). It answers by exact key and never applies environment
//! defaults itself.

use crate::domain::{ConfigKey, ConfigValue, Result};

/// The explicit configuration channel.
///
/// Implementations return `Ok(None)` for keys that were not set and reserve
/// `Err` for genuine failures of the underlying store, which the resolver
/// propagates.
///
/// # Examples
///
/// ```rust
/// use stackcfg::domain::{ConfigKey, ConfigStore, ConfigValue, Result};
///
/// struct Overrides;
///
/// impl ConfigStore for Overrides {
///     fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
///         Ok((key.as_str() == "vpc:nat_strategy").then(|| ConfigValue::from("single")))
///     }
/// }
///
/// let store = Overrides;
/// assert!(store.has(&ConfigKey::from("vpc:nat_strategy")).unwrap());
/// assert!(store.get_str("vpc:cidr_block").unwrap().is_none());
/// ```
pub trait ConfigStore {
    /// Retrieves the explicitly configured value for `key`, if any.
    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>>;

    /// Returns true if `key` has an explicit value.
    fn has(&self, key: &ConfigKey) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Retrieves a value for a key given as a string slice.
    fn get_str(&self, key: &str) -> Result<Option<ConfigValue>> {
        self.get(&ConfigKey::from(key))
    }
}

/// A store with no explicit values; every key falls through to defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStore;

impl ConfigStore for EmptyStore {
    fn get(&self, _key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StackError;

    struct FailingStore;

    impl ConfigStore for FailingStore {
        fn get(&self, _key: &ConfigKey) -> Result<Option<ConfigValue>> {
            Err(StackError::SourceError {
                source_name: "broken".to_string(),
                message: "unreachable".to_string(),
                source: None,
            })
        }
    }

    #[test]
    fn test_empty_store() {
        let store = EmptyStore;
        assert!(store.get_str("vpc:cidr_block").unwrap().is_none());
        assert!(!store.has(&ConfigKey::from("vpc:cidr_block")).unwrap());
    }

    #[test]
    fn test_has_propagates_errors() {
        let store = FailingStore;
        assert!(store.has(&ConfigKey::from("any:key")).is_err());
    }
}
