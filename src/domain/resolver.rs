// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration resolution.
//!
//! Resolution picks, in order:
//!
//! 1. the explicit value from the configuration channel,
//! 2. the environment default from the [`DefaultsTable`],
//! 3. the fallback supplied by the calling module,
//!
//! and coerces the winner to the requested type. Resolution is deterministic and
//! has no side effects beyond debug logging.

use crate::domain::{
    ConfigKey, ConfigStore, ConfigValue, DefaultsTable, Environment, Result, StackError,
};
use std::fmt;

/// Type a caller expects a resolved value to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Returned verbatim
    String,
    /// Lenient: only case-insensitive `"true"` is true
    Bool,
    /// Strict base-10 `i64`
    Int,
}

impl std::str::FromStr for ValueType {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" | "str" => Ok(ValueType::String),
            "bool" | "boolean" => Ok(ValueType::Bool),
            "int" | "integer" => Ok(ValueType::Int),
            other => Err(StackError::invalid_value("type", other, "value type")),
        }
    }
}

/// A resolved, typed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    /// A string value
    String(String),
    /// A boolean value
    Bool(bool),
    /// An integer value
    Int(i64),
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::String(s) => write!(f, "{}", s),
            ResolvedValue::Bool(b) => write!(f, "{}", b),
            ResolvedValue::Int(n) => write!(f, "{}", n),
        }
    }
}

/// Which precedence tier supplied a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    /// Set explicitly through the configuration channel
    Explicit,
    /// Taken from the environment defaults table
    EnvironmentDefault,
    /// The caller's fallback
    Fallback,
    /// Nothing at any tier
    Absent,
}

impl fmt::Display for ValueOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueOrigin::Explicit => "config",
            ValueOrigin::EnvironmentDefault => "defaults",
            ValueOrigin::Fallback => "fallback",
            ValueOrigin::Absent => "absent",
        };
        f.write_str(label)
    }
}

/// Picks the winning raw value and its origin.
fn select<'v>(
    key: &ConfigKey,
    explicit: Option<&'v ConfigValue>,
    environment: &Environment,
    fallback: Option<&'v ConfigValue>,
    defaults: &'v DefaultsTable,
) -> (Option<&'v ConfigValue>, ValueOrigin) {
    if let Some(value) = explicit {
        return (Some(value), ValueOrigin::Explicit);
    }
    if let Some(value) = defaults.lookup(environment, key) {
        return (Some(value), ValueOrigin::EnvironmentDefault);
    }
    match fallback {
        Some(value) => (Some(value), ValueOrigin::Fallback),
        None => (None, ValueOrigin::Absent),
    }
}

/// Coerces a raw value to the expected type.
fn coerce(key: &ConfigKey, value: &ConfigValue, expected: ValueType) -> Result<ResolvedValue> {
    Ok(match expected {
        ValueType::String => ResolvedValue::String(value.as_string()),
        ValueType::Bool => ResolvedValue::Bool(value.as_bool()),
        ValueType::Int => ResolvedValue::Int(value.as_int(key.as_str())?),
    })
}

/// Resolves one key.
///
/// Returns `Ok(None)` when no tier has a value, and `ConfigTypeError` when the
/// winning value cannot be coerced to `expected`. A coercion failure is never
/// papered over with a lower tier.
///
/// # Examples
///
/// ```
/// use stackcfg::domain::resolver::{resolve, ResolvedValue, ValueType};
/// use stackcfg::domain::{ConfigKey, ConfigValue, DefaultsTable, Environment};
///
/// let key = ConfigKey::from("vpc:subnet_count");
/// let prod = Environment::from("prod");
/// let defaults = DefaultsTable::builtin();
///
/// let resolved = resolve(&key, ValueType::Int, None, &prod, None, defaults).unwrap();
/// assert_eq!(resolved, Some(ResolvedValue::Int(3)));
///
/// let explicit = ConfigValue::from("5");
/// let resolved = resolve(&key, ValueType::Int, Some(&explicit), &prod, None, defaults).unwrap();
/// assert_eq!(resolved, Some(ResolvedValue::Int(5)));
/// ```
pub fn resolve(
    key: &ConfigKey,
    expected: ValueType,
    explicit: Option<&ConfigValue>,
    environment: &Environment,
    fallback: Option<&ConfigValue>,
    defaults: &DefaultsTable,
) -> Result<Option<ResolvedValue>> {
    let (value, origin) = select(key, explicit, environment, fallback, defaults);
    tracing::debug!(
        "Resolved '{}' for environment '{}' from {}",
        key,
        environment,
        origin
    );
    value.map(|v| coerce(key, v, expected)).transpose()
}

/// Per-environment view over the explicit channel and the defaults table.
///
/// This is what provisioning modules use to read every environment-varying
/// value.
///
/// # Examples
///
/// ```
/// use stackcfg::domain::resolver::Resolver;
/// use stackcfg::domain::{DefaultsTable, EmptyStore, Environment};
///
/// let store = EmptyStore;
/// let resolver = Resolver::new(&store, DefaultsTable::builtin(), Environment::from("dev"));
///
/// assert_eq!(resolver.get_string("vpc:nat_strategy", "single").unwrap(), "none");
/// assert_eq!(resolver.get_int("vpc:subnet_count", 1).unwrap(), 2);
/// assert!(!resolver.get_bool("iam:enable_eks_permissions", false).unwrap());
/// ```
pub struct Resolver<'a> {
    explicit: &'a dyn ConfigStore,
    defaults: &'a DefaultsTable,
    environment: Environment,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for one environment.
    pub fn new(
        explicit: &'a dyn ConfigStore,
        defaults: &'a DefaultsTable,
        environment: Environment,
    ) -> Self {
        Self {
            explicit,
            defaults,
            environment,
        }
    }

    /// The environment this resolver answers for.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Resolves `key` to the expected type, with an optional fallback.
    pub fn resolve(
        &self,
        key: &ConfigKey,
        expected: ValueType,
        fallback: Option<&ConfigValue>,
    ) -> Result<Option<ResolvedValue>> {
        let explicit = self.explicit.get(key)?;
        resolve(
            key,
            expected,
            explicit.as_ref(),
            &self.environment,
            fallback,
            self.defaults,
        )
    }

    /// Reports which tier would supply `key` given an optional fallback.
    pub fn origin(&self, key: &str, fallback: Option<&ConfigValue>) -> Result<ValueOrigin> {
        let key = ConfigKey::from(key);
        let explicit = self.explicit.get(&key)?;
        let (_, origin) = select(
            &key,
            explicit.as_ref(),
            &self.environment,
            fallback,
            self.defaults,
        );
        Ok(origin)
    }

    /// Resolves a string, returning `None` if no tier has a value.
    pub fn get_optional_string(&self, key: &str) -> Result<Option<String>> {
        let key = ConfigKey::from(key);
        Ok(match self.resolve(&key, ValueType::String, None)? {
            Some(ResolvedValue::String(s)) => Some(s),
            _ => None,
        })
    }

    /// Resolves a string with a fallback.
    pub fn get_string(&self, key: &str, fallback: &str) -> Result<String> {
        Ok(self
            .get_optional_string(key)?
            .unwrap_or_else(|| fallback.to_string()))
    }

    /// Resolves a string that must be present at some tier.
    pub fn require_string(&self, key: &str) -> Result<String> {
        self.get_optional_string(key)?
            .ok_or_else(|| self.missing(key))
    }

    /// Resolves a boolean with a fallback.
    pub fn get_bool(&self, key: &str, fallback: bool) -> Result<bool> {
        let key = ConfigKey::from(key);
        let fallback = ConfigValue::from(fallback);
        Ok(matches!(
            self.resolve(&key, ValueType::Bool, Some(&fallback))?,
            Some(ResolvedValue::Bool(true))
        ))
    }

    /// Resolves an integer with a fallback.
    ///
    /// A non-numeric winning value is a `ConfigTypeError`.
    pub fn get_int(&self, key: &str, fallback: i64) -> Result<i64> {
        let key = ConfigKey::from(key);
        let fallback_value = ConfigValue::from(fallback);
        match self.resolve(&key, ValueType::Int, Some(&fallback_value))? {
            Some(ResolvedValue::Int(n)) => Ok(n),
            _ => Ok(fallback),
        }
    }

    /// Resolves a comma separated list with a fallback.
    pub fn get_list(&self, key: &str, fallback: &[&str]) -> Result<Vec<String>> {
        Ok(match self.get_optional_string(key)? {
            Some(raw) => ConfigValue::from(raw).as_list(),
            None => fallback.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Resolves a comma separated list that must be present and non-empty.
    pub fn require_list(&self, key: &str) -> Result<Vec<String>> {
        let items = ConfigValue::from(self.require_string(key)?).as_list();
        if items.is_empty() {
            return Err(self.missing(key));
        }
        Ok(items)
    }

    fn missing(&self, key: &str) -> StackError {
        StackError::MissingRequiredConfig {
            key: key.to_string(),
            environment: self.environment.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapStore(HashMap<String, String>);

    impl MapStore {
        fn new(entries: &[(&str, &str)]) -> Self {
            MapStore(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigStore for MapStore {
        fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
            Ok(self.0.get(key.as_str()).map(|v| ConfigValue::from(v.as_str())))
        }
    }

    fn table() -> DefaultsTable {
        DefaultsTable::builder()
            .environment("dev", &[("app:mode", "default"), ("app:count", "abc")])
            .build()
    }

    #[test]
    fn test_precedence_explicit_wins() {
        let key = ConfigKey::from("app:mode");
        let explicit = ConfigValue::from("explicit");
        let fallback = ConfigValue::from("fallback");
        let resolved = resolve(
            &key,
            ValueType::String,
            Some(&explicit),
            &Environment::from("dev"),
            Some(&fallback),
            &table(),
        )
        .unwrap();
        assert_eq!(resolved, Some(ResolvedValue::String("explicit".into())));
    }

    #[test]
    fn test_precedence_default_over_fallback() {
        let key = ConfigKey::from("app:mode");
        let fallback = ConfigValue::from("fallback");
        let resolved = resolve(
            &key,
            ValueType::String,
            None,
            &Environment::from("dev"),
            Some(&fallback),
            &table(),
        )
        .unwrap();
        assert_eq!(resolved, Some(ResolvedValue::String("default".into())));
    }

    #[test]
    fn test_precedence_fallback_last() {
        let key = ConfigKey::from("app:mode");
        let fallback = ConfigValue::from("fallback");
        let resolved = resolve(
            &key,
            ValueType::String,
            None,
            &Environment::from("prod"),
            Some(&fallback),
            &table(),
        )
        .unwrap();
        assert_eq!(resolved, Some(ResolvedValue::String("fallback".into())));
    }

    #[test]
    fn test_absent_everywhere() {
        let key = ConfigKey::from("app:missing");
        let resolved = resolve(
            &key,
            ValueType::String,
            None,
            &Environment::from("dev"),
            None,
            &table(),
        )
        .unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_bad_winning_value_is_an_error_even_with_fallback() {
        let key = ConfigKey::from("app:count");
        let fallback = ConfigValue::from("2");
        let err = resolve(
            &key,
            ValueType::Int,
            None,
            &Environment::from("dev"),
            Some(&fallback),
            &table(),
        )
        .unwrap_err();
        assert!(matches!(err, StackError::ConfigTypeError { .. }));
    }

    #[test]
    fn test_resolver_helpers() {
        let store = MapStore::new(&[
            ("vpc:subnet_count", "4"),
            ("iam:enable_eks_permissions", "True"),
            ("eks:public_subnet_ids", "subnet-a,subnet-b"),
        ]);
        let resolver = Resolver::new(&store, DefaultsTable::builtin(), Environment::from("dev"));

        assert_eq!(resolver.get_int("vpc:subnet_count", 1).unwrap(), 4);
        assert!(resolver.get_bool("iam:enable_eks_permissions", false).unwrap());
        assert_eq!(resolver.get_string("vpc:nat_strategy", "single").unwrap(), "none");
        assert_eq!(resolver.get_string("vpc:name", "dev-vpc").unwrap(), "dev-vpc");
        assert_eq!(
            resolver.require_list("eks:public_subnet_ids").unwrap(),
            vec!["subnet-a".to_string(), "subnet-b".to_string()]
        );
        assert_eq!(
            resolver.get_list("oidc:client_ids", &["sts.amazonaws.com"]).unwrap(),
            vec!["sts.amazonaws.com".to_string()]
        );
    }

    #[test]
    fn test_resolver_origin() {
        let store = MapStore::new(&[("vpc:cidr_block", "10.99.0.0/16")]);
        let resolver = Resolver::new(&store, DefaultsTable::builtin(), Environment::from("dev"));
        let fallback = ConfigValue::from("x");

        assert_eq!(resolver.origin("vpc:cidr_block", None).unwrap(), ValueOrigin::Explicit);
        assert_eq!(
            resolver.origin("vpc:nat_strategy", None).unwrap(),
            ValueOrigin::EnvironmentDefault
        );
        assert_eq!(
            resolver.origin("vpc:name", Some(&fallback)).unwrap(),
            ValueOrigin::Fallback
        );
        assert_eq!(resolver.origin("vpc:name", None).unwrap(), ValueOrigin::Absent);
    }

    #[test]
    fn test_require_string_missing() {
        let store = MapStore::new(&[]);
        let resolver = Resolver::new(&store, DefaultsTable::builtin(), Environment::from("dev"));
        let err = resolver.require_string("oidc:issuer_url").unwrap_err();
        match err {
            StackError::MissingRequiredConfig { key, environment } => {
                assert_eq!(key, "oidc:issuer_url");
                assert_eq!(environment, "dev");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_require_list_rejects_empty() {
        let store = MapStore::new(&[("eks:private_subnet_ids", " , ")]);
        let resolver = Resolver::new(&store, DefaultsTable::builtin(), Environment::from("dev"));
        assert!(matches!(
            resolver.require_list("eks:private_subnet_ids"),
            Err(StackError::MissingRequiredConfig { .. })
        ));
    }

    #[test]
    fn test_value_type_from_str() {
        assert_eq!("int".parse::<ValueType>().unwrap(), ValueType::Int);
        assert_eq!("bool".parse::<ValueType>().unwrap(), ValueType::Bool);
        assert_eq!("string".parse::<ValueType>().unwrap(), ValueType::String);
        assert!("float".parse::<ValueType>().is_err());
    }
}
