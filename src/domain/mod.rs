// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types.
//!
//! Everything here is free of I/O: keys and values, environment and stack names,
//! the defaults table, the resolver, stack outputs, errors and the explicit
//! configuration channel trait.

pub mod config_key;
pub mod config_value;
pub mod defaults;
pub mod errors;
pub mod outputs;
pub mod resolver;
pub mod service;
pub mod stack;

// Re-export commonly used types
pub use config_key::ConfigKey;
pub use config_value::ConfigValue;
pub use defaults::{DefaultsTable, DefaultsTableBuilder};
pub use errors::{Result, StackError};
pub use outputs::{OutputValue, ResourceOutputs};
pub use resolver::{resolve, ResolvedValue, Resolver, ValueOrigin, ValueType};
pub use service::{ConfigStore, EmptyStore};
pub use stack::{Environment, StackIdentifier};
