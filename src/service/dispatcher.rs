// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stack dispatch.
//!
//! The dispatcher turns a stack identifier into exactly one module invocation:
//! parse `<environment>-<component>`, find the module registered for the
//! component, hand it a resolver for the environment. It declares nothing
//! itself.

use crate::domain::{
    ConfigStore, DefaultsTable, EmptyStore, Environment, ResourceOutputs, Resolver, Result,
    StackError, StackIdentifier,
};
use crate::ports::{ProvisionContext, ProvisioningModule, ResourceEngine};
use crate::service::ModuleRegistry;
use std::borrow::Cow;

/// Routes stack identifiers to provisioning modules.
///
/// # Examples
///
/// ```rust
/// use stackcfg::adapters::PlanEngine;
/// use stackcfg::service::StackDispatcher;
///
/// # fn main() -> stackcfg::domain::Result<()> {
/// let dispatcher = StackDispatcher::builder().build();
/// let mut engine = PlanEngine::new();
///
/// let outputs = dispatcher.dispatch("dev-vpc", &mut engine)?;
/// assert_eq!(outputs.get_str("nat_strategy"), Some("none"));
/// # Ok(())
/// # }
/// ```
pub struct StackDispatcher {
    registry: ModuleRegistry,
    store: Box<dyn ConfigStore>,
    defaults: Cow<'static, DefaultsTable>,
}

impl StackDispatcher {
    /// Creates a dispatcher over the built-in defaults table.
    pub fn new(registry: ModuleRegistry, store: Box<dyn ConfigStore>) -> Self {
        Self {
            registry,
            store,
            defaults: Cow::Borrowed(DefaultsTable::builtin()),
        }
    }

    /// Creates a dispatcher builder.
    pub fn builder() -> StackDispatcherBuilder {
        StackDispatcherBuilder::new()
    }

    /// The module registry.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The defaults table.
    pub fn defaults(&self) -> &DefaultsTable {
        &self.defaults
    }

    /// Returns true if this dispatcher's defaults table has a row for
    /// `environment`.
    pub fn has_defaults_for(&self, environment: &Environment) -> bool {
        self.defaults.contains(environment)
    }

    /// Parses `stack_id` and finds its module without invoking it.
    ///
    /// Fails with `MalformedStackIdentifier` or `UnknownComponent`.
    pub fn route(&self, stack_id: &str) -> Result<(StackIdentifier, &dyn ProvisioningModule)> {
        let stack = StackIdentifier::parse(stack_id)?;
        let module = self
            .registry
            .get(stack.component())
            .ok_or_else(|| StackError::UnknownComponent {
                component: stack.component().to_string(),
                registered: self.registry.components().join(", "),
            })?;
        Ok((stack, module))
    }

    /// A resolver over this dispatcher's store and defaults for `environment`.
    pub fn resolver(&self, environment: Environment) -> Resolver<'_> {
        Resolver::new(self.store.as_ref(), &self.defaults, environment)
    }

    /// Dispatches `stack_id`: routes it and runs the selected module exactly
    /// once against `engine`.
    ///
    /// Routing errors are raised before the engine sees any declaration. Module
    /// errors are returned as is.
    pub fn dispatch(
        &self,
        stack_id: &str,
        engine: &mut dyn ResourceEngine,
    ) -> Result<ResourceOutputs> {
        let (stack, module) = self.route(stack_id)?;
        let environment = stack.environment().clone();

        if !self.has_defaults_for(&environment) {
            tracing::warn!(
                "Environment '{}' has no defaults; only explicit values and fallbacks apply",
                environment
            );
        }
        tracing::info!(
            "Dispatching stack '{}' to component '{}' (environment '{}', engine '{}')",
            stack,
            module.component(),
            environment,
            engine.name()
        );

        let mut ctx = ProvisionContext::new(self.resolver(environment.clone()), engine);
        let outputs = module.run(&environment, &mut ctx)?;

        tracing::info!("Stack '{}' exported {} outputs", stack, outputs.len());
        Ok(outputs)
    }
}

/// Builder for constructing a `StackDispatcher`.
///
/// Unset parts default to the built-in registry, an empty explicit store and the
/// built-in defaults table.
#[derive(Default)]
pub struct StackDispatcherBuilder {
    registry: Option<ModuleRegistry>,
    store: Option<Box<dyn ConfigStore>>,
    defaults: Option<DefaultsTable>,
}

impl StackDispatcherBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific registry.
    pub fn with_registry(mut self, registry: ModuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Uses a specific explicit configuration store.
    pub fn with_store(mut self, store: impl ConfigStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Uses a custom defaults table instead of the built-in one.
    pub fn with_defaults(mut self, defaults: DefaultsTable) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> StackDispatcher {
        StackDispatcher {
            registry: self.registry.unwrap_or_else(ModuleRegistry::builtin),
            store: self.store.unwrap_or_else(|| Box::new(EmptyStore)),
            defaults: match self.defaults {
                Some(table) => Cow::Owned(table),
                None => Cow::Borrowed(DefaultsTable::builtin()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::PlanEngine;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl ProvisioningModule for Counting {
        fn component(&self) -> &str {
            "counter"
        }

        fn run(&self, env: &Environment, ctx: &mut ProvisionContext<'_>) -> Result<ResourceOutputs> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outputs = ResourceOutputs::new();
            outputs.export("environment", env.as_str());
            outputs.export("mode", ctx.resolver().get_string("counter:mode", "fallback")?);
            Ok(outputs)
        }
    }

    fn counting_dispatcher(defaults: DefaultsTable) -> (StackDispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = ModuleRegistry::new().with_module(Box::new(Counting {
            calls: Arc::clone(&calls),
        }));
        let dispatcher = StackDispatcher::builder()
            .with_registry(registry)
            .with_defaults(defaults)
            .build();
        (dispatcher, calls)
    }

    #[test]
    fn test_dispatch_invokes_once_with_environment() {
        let defaults = DefaultsTable::builder()
            .environment("qa", &[("counter:mode", "table")])
            .build();
        let (dispatcher, calls) = counting_dispatcher(defaults);
        let mut engine = PlanEngine::new();

        let outputs = dispatcher.dispatch("qa-counter", &mut engine).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outputs.get_str("environment"), Some("qa"));
        assert_eq!(outputs.get_str("mode"), Some("table"));
    }

    #[test]
    fn test_dispatch_unknown_component() {
        let (dispatcher, calls) = counting_dispatcher(DefaultsTable::default());
        let mut engine = PlanEngine::new();

        let err = dispatcher.dispatch("dev-vpc", &mut engine).unwrap_err();
        match err {
            StackError::UnknownComponent {
                component,
                registered,
            } => {
                assert_eq!(component, "vpc");
                assert_eq!(registered, "counter");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(engine.resources().is_empty());
    }

    #[test]
    fn test_dispatch_malformed_identifier() {
        let (dispatcher, calls) = counting_dispatcher(DefaultsTable::default());
        let mut engine = PlanEngine::new();

        for id in ["devcounter", "dev-eu-counter", "-counter", "dev-", ""] {
            let err = dispatcher.dispatch(id, &mut engine).unwrap_err();
            assert!(
                matches!(err, StackError::MalformedStackIdentifier { .. }),
                "{id:?} gave {err:?}"
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_route_does_not_invoke() {
        let (dispatcher, calls) = counting_dispatcher(DefaultsTable::default());
        let (stack, module) = dispatcher.route("prod-counter").unwrap();

        assert_eq!(stack.environment().as_str(), "prod");
        assert_eq!(module.component(), "counter");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_known_environments_follow_defaults_table() {
        let defaults = DefaultsTable::builder()
            .environment("qa", &[("counter:mode", "table")])
            .build();
        let (dispatcher, _) = counting_dispatcher(defaults);
        assert!(dispatcher.has_defaults_for(&Environment::from("qa")));
        assert!(!dispatcher.has_defaults_for(&Environment::from("dev")));

        let builtin = StackDispatcher::builder().build();
        for env in ["dev", "staging", "prod"] {
            assert!(builtin.has_defaults_for(&Environment::from(env)));
        }
        assert!(!builtin.has_defaults_for(&Environment::from("qa")));
    }

    #[test]
    fn test_builder_defaults() {
        let dispatcher = StackDispatcher::builder().build();
        assert_eq!(dispatcher.registry().components(), vec!["eks", "iam", "oidc", "vpc"]);
        assert_eq!(dispatcher.defaults(), DefaultsTable::builtin());
    }
}
