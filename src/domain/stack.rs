// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stack identifiers and environment names.
//!
//! A stack is named `<environment>-<component>`, e.g. `dev-vpc`. Parsing is strict:
//! the identifier must contain exactly one `-` and both halves must be non-empty.
//! Multi-segment names such as `dev-eu-vpc` are rejected rather than guessed at.

use crate::domain::errors::{Result, StackError};
use std::fmt;
use std::str::FromStr;

/// Separator between the environment and the component of a stack identifier.
pub const STACK_SEPARATOR: char = '-';

/// A deployment tier name.
///
/// Any non-empty name is accepted. Names without a row in the defaults table
/// simply have no defaults.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Environment(String);

impl Environment {
    /// Creates an environment name.
    pub fn new(name: impl Into<String>) -> Self {
        Environment(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Environment {
    fn from(s: &str) -> Self {
        Environment(s.to_string())
    }
}

impl AsRef<str> for Environment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed `<environment>-<component>` stack identifier.
///
/// # Examples
///
/// ```
/// use stackcfg::domain::stack::StackIdentifier;
///
/// let stack: StackIdentifier = "prod-eks".parse().unwrap();
/// assert_eq!(stack.environment().as_str(), "prod");
/// assert_eq!(stack.component(), "eks");
///
/// assert!("dev-eu-vpc".parse::<StackIdentifier>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StackIdentifier {
    raw: String,
    environment: Environment,
    component: String,
}

impl StackIdentifier {
    /// Parses a stack identifier.
    ///
    /// Fails with `MalformedStackIdentifier` when the separator is missing, appears
    /// more than once, or either part is empty.
    pub fn parse(identifier: &str) -> Result<Self> {
        let malformed = |reason: &str| StackError::MalformedStackIdentifier {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        };

        let separators = identifier.matches(STACK_SEPARATOR).count();
        if separators == 0 {
            return Err(malformed("expected '<environment>-<component>', found no '-'"));
        }
        if separators > 1 {
            return Err(malformed(&format!(
                "expected exactly one '-', found {}",
                separators
            )));
        }

        let (environment, component) = identifier
            .split_once(STACK_SEPARATOR)
            .ok_or_else(|| malformed("missing '-' separator"))?;
        if environment.is_empty() {
            return Err(malformed("environment part is empty"));
        }
        if component.is_empty() {
            return Err(malformed("component part is empty"));
        }

        Ok(Self {
            raw: identifier.to_string(),
            environment: Environment::from(environment),
            component: component.to_string(),
        })
    }

    /// The environment half of the identifier.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The component half of the identifier.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// The identifier exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for StackIdentifier {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for StackIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_identifiers() {
        for (raw, env, component) in [
            ("dev-vpc", "dev", "vpc"),
            ("staging-eks", "staging", "eks"),
            ("prod-iam", "prod", "iam"),
            ("qa-oidc", "qa", "oidc"),
        ] {
            let stack = StackIdentifier::parse(raw).unwrap();
            assert_eq!(stack.environment().as_str(), env);
            assert_eq!(stack.component(), component);
            assert_eq!(stack.as_str(), raw);
        }
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let err = StackIdentifier::parse("devvpc").unwrap_err();
        assert!(matches!(err, StackError::MalformedStackIdentifier { .. }));
    }

    #[test]
    fn test_parse_rejects_multiple_separators() {
        let err = StackIdentifier::parse("dev-eu-vpc").unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        for raw in ["-vpc", "dev-", "-", ""] {
            assert!(
                StackIdentifier::parse(raw).is_err(),
                "accepted malformed identifier {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_from_str() {
        let stack: StackIdentifier = "dev-vpc".parse().unwrap();
        assert_eq!(stack.to_string(), "dev-vpc");
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::new("sandbox").to_string(), "sandbox");
        assert_eq!(Environment::from("dev").as_str(), "dev");
    }
}
