// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in provisioning modules.
//!
//! One module per component: `vpc`, `iam`, `eks` and `oidc`. Each reads its
//! settings through the resolver and declares resources on the engine.

pub mod eks;
pub mod iam;
pub mod oidc;
pub mod vpc;

pub use eks::EksModule;
pub use iam::IamModule;
pub use oidc::OidcModule;
pub use vpc::VpcModule;

use crate::domain::{Resolver, Result, ValueOrigin};

/// Value of the `ManagedBy` tag.
pub const MANAGED_BY: &str = "Pulumi";

/// Region used when `aws:region` resolves to nothing.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Logs which tier supplied `key`.
pub(crate) fn log_origin(resolver: &Resolver<'_>, key: &str, value: &str) -> Result<()> {
    let origin = match resolver.origin(key, None)? {
        ValueOrigin::Absent => ValueOrigin::Fallback,
        origin => origin,
    };
    tracing::info!("{} = {} (from {})", key, value, origin);
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::adapters::PlanEngine;
    use crate::domain::{
        ConfigKey, ConfigStore, ConfigValue, DefaultsTable, Environment, ResourceOutputs,
        Resolver, Result,
    };
    use crate::ports::{ProvisionContext, ProvisioningModule};
    use std::collections::HashMap;

    pub(crate) struct MapStore(HashMap<String, String>);

    impl MapStore {
        pub(crate) fn new(entries: &[(&str, &str)]) -> Self {
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

    /// Runs `f` with a context over the built-in defaults and `entries` as
    /// explicit values, then hands back the engine.
    pub(crate) fn with_context_on<R>(
        mut engine: PlanEngine,
        env: &str,
        entries: &[(&str, &str)],
        f: impl FnOnce(&mut ProvisionContext<'_>) -> R,
    ) -> (R, PlanEngine) {
        let store = MapStore::new(entries);
        let result = {
            let resolver = Resolver::new(&store, DefaultsTable::builtin(), Environment::from(env));
            let mut ctx = ProvisionContext::new(resolver, &mut engine);
            f(&mut ctx)
        };
        (result, engine)
    }

    pub(crate) fn with_context<R>(
        env: &str,
        entries: &[(&str, &str)],
        f: impl FnOnce(&mut ProvisionContext<'_>) -> R,
    ) -> (R, PlanEngine) {
        with_context_on(PlanEngine::new(), env, entries, f)
    }

    pub(crate) fn run_module_on(
        engine: PlanEngine,
        module: &dyn ProvisioningModule,
        env: &str,
        entries: &[(&str, &str)],
    ) -> (Result<ResourceOutputs>, PlanEngine) {
        let environment = Environment::from(env);
        with_context_on(engine, env, entries, |ctx| module.run(&environment, ctx))
    }

    pub(crate) fn run_module(
        module: &dyn ProvisioningModule,
        env: &str,
        entries: &[(&str, &str)],
    ) -> (Result<ResourceOutputs>, PlanEngine) {
        run_module_on(PlanEngine::new(), module, env, entries)
    }
}
