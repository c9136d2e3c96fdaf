// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component registry.
//!
//! Maps component names to provisioning modules. Registration happens at
//! start-up; lookups never resolve code from strings at run time.

use crate::modules::{EksModule, IamModule, OidcModule, VpcModule};
use crate::ports::ProvisioningModule;
use std::collections::HashMap;

/// Registry of provisioning modules keyed by component name.
///
/// # Examples
///
/// ```rust
/// use stackcfg::service::ModuleRegistry;
///
/// let registry = ModuleRegistry::builtin();
/// assert_eq!(registry.components(), vec!["eks", "iam", "oidc", "vpc"]);
/// assert!(registry.get("vpc").is_some());
/// assert!(registry.get("rds").is_none());
/// ```
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Box<dyn ProvisioningModule>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the `vpc`, `eks`, `iam` and `oidc` modules.
    pub fn builtin() -> Self {
        Self::new()
            .with_module(Box::new(VpcModule))
            .with_module(Box::new(EksModule))
            .with_module(Box::new(IamModule))
            .with_module(Box::new(OidcModule))
    }

    /// Registers a module under its component name.
    ///
    /// Registering a second module for the same component replaces the first.
    pub fn register(&mut self, module: Box<dyn ProvisioningModule>) {
        let component = module.component().to_string();
        if self.modules.contains_key(&component) {
            tracing::warn!("Replacing provisioning module for component '{}'", component);
        }
        self.modules.insert(component, module);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_module(mut self, module: Box<dyn ProvisioningModule>) -> Self {
        self.register(module);
        self
    }

    /// Returns the module registered under `component`.
    pub fn get(&self, component: &str) -> Option<&dyn ProvisioningModule> {
        self.modules.get(component).map(|m| m.as_ref())
    }

    /// Registered component names, sorted.
    pub fn components(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
