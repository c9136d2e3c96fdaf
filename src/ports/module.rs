// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provisioning module trait definition.
//!
//! A provisioning module owns one component (`vpc`, `eks`, ...). The dispatcher
//! calls its `run` entry point exactly once per process with the environment
//! parsed from the stack identifier.

use crate::domain::{Environment, ResourceOutputs, Resolver, Result};
use crate::ports::{ResourceEngine, ResourceRef, ResourceSpec};

/// What a module gets to work with besides its environment: the resolver for
/// every environment-varying value and the engine to declare resources on.
pub struct ProvisionContext<'a> {
    resolver: Resolver<'a>,
    engine: &'a mut dyn ResourceEngine,
}

impl<'a> ProvisionContext<'a> {
    /// Bundles a resolver and an engine.
    pub fn new(resolver: Resolver<'a>, engine: &'a mut dyn ResourceEngine) -> Self {
        Self { resolver, engine }
    }

    /// The configuration resolver for this run's environment.
    pub fn resolver(&self) -> &Resolver<'a> {
        &self.resolver
    }

    /// The resource engine.
    pub fn engine(&mut self) -> &mut dyn ResourceEngine {
        self.engine
    }

    /// Declares a resource on the engine.
    pub fn declare(&mut self, spec: ResourceSpec) -> Result<ResourceRef> {
        tracing::debug!("Declaring {} '{}'", spec.kind, spec.name);
        self.engine.declare(spec)
    }
}

/// Entry point of one infrastructure component.
///
/// Implementations must read every environment-varying value through
/// [`ProvisionContext::resolver`] and must be idempotent under the engine's
/// reconciliation model: the same inputs always produce the same declarations.
///
/// # Examples
///
/// ```rust
/// use stackcfg::domain::{Environment, ResourceOutputs, Result};
/// use stackcfg::ports::{ProvisionContext, ProvisioningModule};
///
/// struct Noop;
///
/// impl ProvisioningModule for Noop {
///     fn component(&self) -> &str {
///         "noop"
///     }
///
///     fn run(&self, environment: &Environment, _ctx: &mut ProvisionContext<'_>) -> Result<ResourceOutputs> {
///         let mut outputs = ResourceOutputs::new();
///         outputs.export("environment", environment.as_str());
///         Ok(outputs)
///     }
/// }
/// ```
pub trait ProvisioningModule: Send + Sync {
    /// Component name this module is registered under.
    fn component(&self) -> &str;

    /// One-line description for listings.
    fn description(&self) -> &str {
        ""
    }

    /// Declares the component's resources for `environment` and returns its
    /// outputs.
    fn run(
        &self,
        environment: &Environment,
        ctx: &mut ProvisionContext<'_>,
    ) -> Result<ResourceOutputs>;
}
