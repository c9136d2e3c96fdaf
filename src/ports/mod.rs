// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! These traits are the seams to everything outside the dispatch and resolution
//! core: where explicit configuration comes from, how stack files are parsed,
//! the infrastructure engine, and the provisioning modules themselves.

pub mod engine;
pub mod module;
pub mod parser;
pub mod source;

// Re-export commonly used types
pub use engine::{ResourceEngine, ResourceKind, ResourceRef, ResourceSpec};
pub use module::{ProvisionContext, ProvisioningModule};
pub use parser::ConfigParser;
pub use source::ConfigSource;
