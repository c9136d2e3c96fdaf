// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer wiring sources, defaults, modules and the engine together.
//!
//! `StackConfigStore` aggregates explicit sources into one channel,
//! `ModuleRegistry` maps component names to modules and `StackDispatcher` routes
//! a stack identifier to its module.

pub mod config_store;
pub mod dispatcher;
pub mod registry;

// Re-export commonly used types
pub use config_store::{StackConfigStore, StackConfigStoreBuilder};
pub use dispatcher::{StackDispatcher, StackDispatcherBuilder};
pub use registry::ModuleRegistry;
