// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for integration tests.

#![allow(dead_code)]

use stackcfg::domain::{ConfigKey, ConfigValue, Environment, ResourceOutputs, Result};
use stackcfg::ports::{ConfigSource, ProvisionContext, ProvisioningModule};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory configuration source with a fixed name and priority.
pub struct MockConfigSource {
    name: String,
    priority: u8,
    values: HashMap<String, String>,
}

impl MockConfigSource {
    pub fn new(name: &str, priority: u8) -> Self {
        Self {
            name: name.to_string(),
            priority,
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl ConfigSource for MockConfigSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn get(&self, key: &ConfigKey) -> Result<Option<ConfigValue>> {
        Ok(self
            .values
            .get(key.as_str())
            .map(|v| ConfigValue::from(v.as_str())))
    }

    fn all_keys(&self) -> Result<Vec<ConfigKey>> {
        Ok(self
            .values
            .keys()
            .map(|k| ConfigKey::from(k.as_str()))
            .collect())
    }
}

/// Module that records every environment it was run with.
///
/// Clones share the same record.
#[derive(Clone)]
pub struct RecordingModule {
    component: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingModule {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Environments passed to `run`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProvisioningModule for RecordingModule {
    fn component(&self) -> &str {
        &self.component
    }

    fn run(&self, environment: &Environment, _ctx: &mut ProvisionContext<'_>) -> Result<ResourceOutputs> {
        self.calls.lock().unwrap().push(environment.to_string());
        let mut outputs = ResourceOutputs::new();
        outputs.export("environment", environment.as_str());
        Ok(outputs)
    }
}

/// Guard that sets environment variables and removes them on drop.
pub struct EnvGuard {
    keys: Vec<String>,
}

impl EnvGuard {
    pub fn new() -> Self {
        EnvGuard { keys: Vec::new() }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
        self.keys.push(key.to_string());
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            std::env::remove_var(key);
        }
    }
}
