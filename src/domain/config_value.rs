// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration value type with typed coercions.
//!
//! Values are always carried as strings, the way the engine's configuration store
//! and the environment defaults table hold them, and are coerced at the point of
//! use.

use crate::domain::errors::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A string-backed configuration value.
///
/// # Examples
///
/// ```
/// use stackcfg::domain::config_value::ConfigValue;
///
/// let value = ConfigValue::from("3");
/// assert_eq!(value.as_int("vpc:subnet_count").unwrap(), 3);
/// assert!(!value.as_bool());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigValue(String);

impl ConfigValue {
    /// Creates a new `ConfigValue` from a `String`.
    pub fn new(value: String) -> Self {
        ConfigValue(value)
    }

    /// Returns the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the value into a `String`.
    pub fn as_string(&self) -> String {
        self.0.clone()
    }

    /// Lenient boolean coercion.
    ///
    /// Only `"true"`, compared case-insensitively, is true. Every other string,
    /// including `"yes"`, `"1"` and the empty string, is false. No whitespace is
    /// trimmed, so `" true"` is false as well.
    ///
    /// ```
    /// use stackcfg::domain::config_value::ConfigValue;
    ///
    /// assert!(ConfigValue::from("TRUE").as_bool());
    /// assert!(!ConfigValue::from("yes").as_bool());
    /// ```
    pub fn as_bool(&self) -> bool {
        self.0.eq_ignore_ascii_case("true")
    }

    /// Strict base-10 integer coercion.
    ///
    /// A non-numeric value is a `ConfigTypeError` naming `key`.
    pub fn as_int(&self, key: &str) -> Result<i64> {
        self.0
            .parse::<i64>()
            .map_err(|e| StackError::from_parse_int_error(key, &self.0, e))
    }

    /// Splits a comma separated value into its trimmed, non-empty items.
    ///
    /// ```
    /// use stackcfg::domain::config_value::ConfigValue;
    ///
    /// let value = ConfigValue::from("subnet-a, subnet-b,");
    /// assert_eq!(value.as_list(), vec!["subnet-a", "subnet-b"]);
    /// ```
    pub fn as_list(&self) -> Vec<String> {
        self.0
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parses the value into any type that implements `FromStr`.
    pub fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.0
            .parse::<T>()
            .map_err(|e| StackError::ConfigTypeError {
                key: key.to_string(),
                value: self.0.clone(),
                target_type: std::any::type_name::<T>().to_string(),
                source: Some(Box::new(e)),
            })
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue(s.to_string())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue(b.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue(n.to_string())
    }
}

impl From<ConfigValue> for String {
    fn from(value: ConfigValue) -> Self {
        value.0
    }
}

impl AsRef<str> for ConfigValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
