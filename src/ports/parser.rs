// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stack file parser trait definition.
//!
//! A `ConfigParser` turns the text of a stack configuration file into the flat
//! `namespace:key -> value` map held by the explicit configuration channel.

use crate::domain::Result;
use std::collections::HashMap;

/// A trait for parsing stack configuration files.
///
/// # Key Format
///
/// Parsers return keys exactly as the engine names them. For a stack file like:
///
/// ```yaml
/// config:
///   vpc:nat_strategy: single
///   eks:public_subnet_ids:
///     - subnet-a
///     - subnet-b
/// ```
///
/// the result is:
/// - `vpc:nat_strategy` -> `"single"`
/// - `eks:public_subnet_ids` -> `"subnet-a,subnet-b"`
///
/// Keys whose value is null are omitted: an explicit null is not an override.
pub trait ConfigParser {
    /// Parses file content into a flat key/value map.
    fn parse(&self, content: &str) -> Result<HashMap<String, String>>;

    /// File extensions (without the leading dot) this parser handles.
    fn supported_extensions(&self) -> &[&str];

    /// Returns true if `path` has one of the supported extensions.
    fn supports(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.supported_extensions().contains(&ext))
    }
}
