// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stack dispatch and environment-aware configuration for AWS provisioning.
//!
//! A stack is named `<environment>-<component>` (`dev-vpc`, `prod-eks`). This
//! crate parses that name, picks the provisioning module registered for the
//! component and runs it with a resolver that answers every configuration
//! question from three tiers:
//!
//! 1. explicit values (command line, `STACKCFG_` environment variables, the
//!    `Pulumi.<stack>.yaml` stack file),
//! 2. the built-in per-environment defaults,
//! 3. the module's own fallback.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: keys, values, stack identifiers, the defaults table, the
//!   resolver, outputs and errors
//! - **Ports**: `ConfigSource`, `ConfigParser`, `ResourceEngine`,
//!   `ProvisioningModule`
//! - **Adapters**: configuration sources and the in-memory `PlanEngine`
//! - **Service**: the aggregated config store, module registry and dispatcher
//! - **Modules**: the `vpc`, `iam`, `eks` and `oidc` components
//!
//! # Feature Flags
//!
//! - `yaml`: Enable stack file support (default)
//! - `env`: Enable environment variable support (default)
//! - `cli`: Enable command-line overrides and the `stackcfg` binary (default)
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use stackcfg::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let store = StackConfigStore::builder()
//!     .with_cli_overrides(vec!["vpc:nat_strategy=single"])?
//!     .build();
//! let dispatcher = StackDispatcher::builder().with_store(store).build();
//!
//! let mut engine = PlanEngine::new();
//! let outputs = dispatcher.dispatch("dev-vpc", &mut engine)?;
//!
//! assert_eq!(outputs.get_str("nat_strategy"), Some("single"));
//! assert_eq!(outputs.get_list("nat_gateway_ids").map(|ids| ids.len()), Some(1));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod modules;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::adapters::PlanEngine;
    pub use crate::domain::{
        ConfigKey, ConfigStore, ConfigValue, DefaultsTable, Environment, OutputValue,
        ResourceOutputs, Resolver, Result, StackError, StackIdentifier,
    };
    pub use crate::ports::{
        ConfigParser, ConfigSource, ProvisionContext, ProvisioningModule, ResourceEngine,
    };
    pub use crate::service::{ModuleRegistry, StackConfigStore, StackDispatcher};

    // Re-export adapters based on feature flags
    #[cfg(feature = "cli")]
    pub use crate::adapters::CommandLineAdapter;
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarAdapter;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::{YamlFileAdapter, YamlParser};
}
