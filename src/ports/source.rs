// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration source trait definition.
//!
//! A `ConfigSource` is one input to the explicit configuration channel: a stack
//! file, the process environment or command-line overrides. Several sources are
//! aggregated by priority into a single `ConfigStore`.

use crate::domain::{ConfigKey, ConfigValue, Result};

/// A single source of explicit configuration values.
///
/// # Priority
///
/// Higher priority values take precedence. The built-in adapters use:
///
/// - **3 (highest)**: Command-line `--config` overrides
/// - **2**: `STACKCFG_` environment variables
/// - **1 (lowest)**: The stack configuration file
///
/// # Examples
///
/// ```rust
/// use stackcfg::ports::ConfigSource;
/// use stackcfg::domain::{ConfigKey, ConfigValue, Result};
///
/// struct Fixed;
///
/// impl ConfigSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn priority(&self) -> u8 {
///         1
///     }
///
///     fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
///         Ok((key.as_str() == "aws:region").then(|| ConfigValue::from("eu-west-1")))
///     }
///
///     fn all_keys(&self) -> Result<Vec<ConfigKey>> {
///         Ok(vec![ConfigKey::from("aws:region")])
///     }
/// }
///
/// let source = Fixed;
/// assert!(source.get_str("aws:region").unwrap().is_some());
/// ```
pub trait ConfigSource: Send + Sync {
    /// Short identifier used in logs and errors ("cli", "env", "stack-file").
    fn name(&self) -> &str;

    /// Precedence of this source; higher wins.
    fn priority(&self) -> u8;

    /// Retrieves a value for `key`.
    ///
    /// * `Ok(Some(ConfigValue))` - The value was set in this source
    /// * `Ok(None)` - The key is not set here
    /// * `Err(StackError)` - The source failed
    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>>;

    /// Returns every key this source sets.
    fn all_keys(&self) -> Result<Vec<ConfigKey>>;

    /// Retrieves a value for a key given as a string slice.
    fn get_str(&self, key: &str) -> Result<Option<ConfigValue>> {
        self.get(&ConfigKey::from(key))
    }
}
