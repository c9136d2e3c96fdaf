// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named stack outputs.
//!
//! Provisioning modules return their results as an ordered map of named values
//! that the engine persists for downstream consumers. Secret values are wrapped so
//! they are masked whenever outputs are serialized or displayed.

use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Text substituted for secret values.
pub const SECRET_MASK: &str = "[secret]";

/// A single output value.
#[derive(Clone, Debug, PartialEq)]
pub enum OutputValue {
    /// A plain string
    String(String),
    /// A numeric value (cost estimates and the like)
    Number(f64),
    /// An ordered list of strings (resource identifiers)
    List(Vec<String>),
    /// A value that must be masked by the engine
    Secret(Box<OutputValue>),
}

impl OutputValue {
    /// Wraps a value as secret.
    pub fn secret(value: impl Into<OutputValue>) -> Self {
        OutputValue::Secret(Box::new(value.into()))
    }

    /// Returns true if the value is flagged as secret.
    pub fn is_secret(&self) -> bool {
        matches!(self, OutputValue::Secret(_))
    }

    /// Returns the string payload of a plain or secret string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OutputValue::String(s) => Some(s),
            OutputValue::Secret(inner) => inner.as_str(),
            _ => None,
        }
    }

    /// Returns the numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            OutputValue::Number(n) => Some(*n),
            OutputValue::Secret(inner) => inner.as_number(),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OutputValue::List(items) => Some(items),
            OutputValue::Secret(inner) => inner.as_list(),
            _ => None,
        }
    }

    /// Returns the value with secrets unwrapped.
    pub fn reveal(&self) -> &OutputValue {
        match self {
            OutputValue::Secret(inner) => inner.reveal(),
            other => other,
        }
    }
}

impl From<String> for OutputValue {
    fn from(s: String) -> Self {
        OutputValue::String(s)
    }
}

impl From<&str> for OutputValue {
    fn from(s: &str) -> Self {
        OutputValue::String(s.to_string())
    }
}

impl From<f64> for OutputValue {
    fn from(n: f64) -> Self {
        OutputValue::Number(n)
    }
}

impl From<Vec<String>> for OutputValue {
    fn from(items: Vec<String>) -> Self {
        OutputValue::List(items)
    }
}

impl Serialize for OutputValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutputValue::String(s) => serializer.serialize_str(s),
            OutputValue::Number(n) => serializer.serialize_f64(*n),
            OutputValue::List(items) => items.serialize(serializer),
            OutputValue::Secret(_) => serializer.serialize_str(SECRET_MASK),
        }
    }
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputValue::String(s) => write!(f, "{}", s),
            OutputValue::Number(n) => write!(f, "{}", n),
            OutputValue::List(items) => write!(f, "[{}]", items.join(", ")),
            OutputValue::Secret(_) => write!(f, "{}", SECRET_MASK),
        }
    }
}

/// Ordered collection of named outputs exported by one module run.
///
/// # Examples
///
/// ```
/// use stackcfg::domain::{OutputValue, ResourceOutputs};
///
/// let mut outputs = ResourceOutputs::new();
/// outputs.export("vpc_id", "vpc-dev-vpc");
/// outputs.export("secret_access_key", OutputValue::secret("hunter2"));
///
/// assert_eq!(outputs.get_str("vpc_id"), Some("vpc-dev-vpc"));
/// assert!(outputs.get("secret_access_key").unwrap().is_secret());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceOutputs {
    values: BTreeMap<String, OutputValue>,
}

impl ResourceOutputs {
    /// Creates an empty output set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exports a named value, replacing any earlier export of the same name.
    pub fn export(&mut self, name: impl Into<String>, value: impl Into<OutputValue>) {
        let name = name.into();
        tracing::debug!("Exporting output '{}'", name);
        self.values.insert(name, value.into());
    }

    /// Returns an output by name.
    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.values.get(name)
    }

    /// Returns a string output by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OutputValue::as_str)
    }

    /// Returns a list output by name.
    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(OutputValue::as_list)
    }

    /// Returns a numeric output by name.
    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OutputValue::as_number)
    }

    /// Iterates over outputs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of outputs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was exported.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a copy with every secret unwrapped, for `--show-secrets` style output.
    pub fn revealed(&self) -> ResourceOutputs {
        ResourceOutputs {
            values: self
                .values
                .iter()
                .map(|(k, v)| (k.clone(), v.reveal().clone()))
                .collect(),
        }
    }
}

impl Serialize for ResourceOutputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_masked_when_serialized() {
        let mut outputs = ResourceOutputs::new();
        outputs.export("access_key_id", OutputValue::secret("AKIA123"));
        outputs.export("iam_user_name", "pulumi-dev-user");

        let json = serde_json::to_string(&outputs).unwrap();
        assert_eq!(
            json,
            r#"{"access_key_id":"[secret]","iam_user_name":"pulumi-dev-user"}"#
        );
    }

    #[test]
    fn test_revealed_unwraps_secrets() {
        let mut outputs = ResourceOutputs::new();
        outputs.export("access_key_id", OutputValue::secret("AKIA123"));

        let revealed = outputs.revealed();
        assert!(!revealed.get("access_key_id").unwrap().is_secret());
        assert_eq!(revealed.get_str("access_key_id"), Some("AKIA123"));
    }

    #[test]
    fn test_typed_accessors() {
        let mut outputs = ResourceOutputs::new();
        outputs.export("nat_gateway_ids", Vec::<String>::new());
        outputs.export("nat_gateway_monthly_cost_estimate", 0.0);

        assert_eq!(outputs.get_list("nat_gateway_ids"), Some(&[][..]));
        assert_eq!(outputs.get_number("nat_gateway_monthly_cost_estimate"), Some(0.0));
        assert_eq!(outputs.get_str("nat_gateway_ids"), None);
        assert_eq!(outputs.len(), 2);
    }

    #[test]
    fn test_export_replaces() {
        let mut outputs = ResourceOutputs::new();
        outputs.export("environment", "dev");
        outputs.export("environment", "prod");
        assert_eq!(outputs.get_str("environment"), Some("prod"));
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(OutputValue::from("x").to_string(), "x");
        assert_eq!(
            OutputValue::from(vec!["a".to_string(), "b".to_string()]).to_string(),
            "[a, b]"
        );
        assert_eq!(OutputValue::secret("x").to_string(), SECRET_MASK);
    }
}
