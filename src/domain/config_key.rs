// SPDX-License-Identifier: MIT OR Apache-2.0

//! Namespaced configuration key.
//!
//! Keys follow the `namespace:name` convention of the infrastructure engine's
//! configuration store, e.g. `vpc:cidr_block` or `aws:region`.

use std::fmt;

/// Separator between a key's namespace and its name.
pub const NAMESPACE_SEPARATOR: char = ':';

/// A type-safe wrapper for configuration keys.
///
/// `ConfigKey` keeps the full key text and exposes the namespace and name parts.
/// Keys without a separator have no namespace.
///
/// # Examples
///
/// ```
/// use stackcfg::domain::config_key::ConfigKey;
///
/// let key = ConfigKey::from("vpc:cidr_block");
/// assert_eq!(key.namespace(), Some("vpc"));
/// assert_eq!(key.name(), "cidr_block");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Builds a key from a namespace and a name.
    ///
    /// ```
    /// use stackcfg::domain::config_key::ConfigKey;
    ///
    /// let key = ConfigKey::namespaced("iam", "enable_eks_permissions");
    /// assert_eq!(key.as_str(), "iam:enable_eks_permissions");
    /// ```
    pub fn namespaced(namespace: &str, name: &str) -> Self {
        ConfigKey(format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the namespace part, if the key has one.
    pub fn namespace(&self) -> Option<&str> {
        self.0
            .split_once(NAMESPACE_SEPARATOR)
            .map(|(namespace, _)| namespace)
    }

    /// Returns the part after the namespace, or the whole key when there is none.
    pub fn name(&self) -> &str {
        self.0
            .split_once(NAMESPACE_SEPARATOR)
            .map_or(self.0.as_str(), |(_, name)| name)
    }

    /// Returns true if the key lives in the given namespace.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace() == Some(namespace)
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
