// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-environment configuration defaults.
//!
//! The built-in table is initialized once, on first access, and is never mutated
//! afterwards. It can be shared freely between threads.

use crate::domain::{ConfigKey, ConfigValue, Environment};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

static BUILTIN_DEFAULTS: Lazy<DefaultsTable> = Lazy::new(|| {
    DefaultsTable::builder()
        .environment(
            "dev",
            &[
                ("aws:region", "us-east-1"),
                ("vpc:cidr_block", "10.10.0.0/16"),
                ("vpc:subnet_count", "2"),
                ("vpc:enable_dns_support", "true"),
                ("vpc:enable_dns_hostnames", "true"),
                // No NAT in dev.
                ("vpc:nat_strategy", "none"),
            ],
        )
        .environment(
            "staging",
            &[
                ("aws:region", "us-east-1"),
                ("vpc:cidr_block", "10.20.0.0/16"),
                ("vpc:subnet_count", "2"),
                ("vpc:enable_dns_support", "true"),
                ("vpc:enable_dns_hostnames", "true"),
                ("vpc:nat_strategy", "single"),
            ],
        )
        .environment(
            "prod",
            &[
                ("aws:region", "us-east-1"),
                ("vpc:cidr_block", "10.30.0.0/16"),
                ("vpc:subnet_count", "3"),
                ("vpc:enable_dns_support", "true"),
                ("vpc:enable_dns_hostnames", "true"),
                ("vpc:nat_strategy", "multi-az"),
            ],
        )
        .build()
});

/// Mapping from environment name to its default key/value pairs.
///
/// # Examples
///
/// ```
/// use stackcfg::domain::{ConfigKey, DefaultsTable, Environment};
///
/// let table = DefaultsTable::builtin();
/// let strategy = table.lookup(&Environment::from("prod"), &ConfigKey::from("vpc:nat_strategy"));
/// assert_eq!(strategy.map(|v| v.as_str()), Some("multi-az"));
///
/// // Unknown environments and keys are simply absent.
/// assert!(table.lookup(&Environment::from("sandbox"), &ConfigKey::from("vpc:nat_strategy")).is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultsTable {
    rows: HashMap<String, BTreeMap<ConfigKey, ConfigValue>>,
}

impl DefaultsTable {
    /// Returns the process-wide built-in table.
    pub fn builtin() -> &'static DefaultsTable {
        &BUILTIN_DEFAULTS
    }

    /// Creates an empty table builder.
    pub fn builder() -> DefaultsTableBuilder {
        DefaultsTableBuilder::default()
    }

    /// Looks up the default for `key` in `environment`.
    ///
    /// Returns `None` for unknown environments as well as unknown keys.
    pub fn lookup(&self, environment: &Environment, key: &ConfigKey) -> Option<&ConfigValue> {
        self.rows.get(environment.as_str())?.get(key)
    }

    /// Returns true if the table has a row for `environment`.
    pub fn contains(&self, environment: &Environment) -> bool {
        self.rows.contains_key(environment.as_str())
    }

    /// Returns the full row for an environment, empty if unknown.
    pub fn row(&self, environment: &Environment) -> impl Iterator<Item = (&ConfigKey, &ConfigValue)> {
        self.rows.get(environment.as_str()).into_iter().flatten()
    }

    /// Returns the environment names present in the table, sorted.
    pub fn environments(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rows.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Builder for a [`DefaultsTable`].
#[derive(Debug, Default)]
pub struct DefaultsTableBuilder {
    rows: HashMap<String, BTreeMap<ConfigKey, ConfigValue>>,
}

impl DefaultsTableBuilder {
    /// Adds (or extends) the row for an environment.
    pub fn environment(mut self, name: &str, entries: &[(&str, &str)]) -> Self {
        let row = self.rows.entry(name.to_string()).or_default();
        for (key, value) in entries {
            row.insert(ConfigKey::from(*key), ConfigValue::from(*value));
        }
        self
    }

    /// Freezes the table.
    pub fn build(self) -> DefaultsTable {
        DefaultsTable { rows: self.rows }
    }
}
