// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML stack file configuration source adapter.
//!
//! Stack files follow the `Pulumi.<stack>.yaml` layout: explicit values live under
//! a top-level `config:` mapping, keyed by their full `namespace:name` key.

use crate::domain::{ConfigKey, ConfigValue, Result, StackError, StackIdentifier};
use crate::ports::{ConfigParser, ConfigSource};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum allowed size for stack files (1MB)
const MAX_STACK_FILE_SIZE: u64 = 1024 * 1024;

/// Top-level key holding the explicit configuration.
const CONFIG_SECTION: &str = "config";

/// YAML stack file parser.
///
/// Flattening rules for the `config:` mapping:
/// - `vpc:cidr_block: 10.1.0.0/16` is taken as is
/// - a mapping under a bare namespace (`oidc: {issuer_url: ...}`) becomes
///   `oidc:issuer_url`
/// - a mapping under a full key is joined with dots (`aws:tags.Owner`)
/// - sequences of scalars become comma separated values
/// - nulls are skipped
///
/// # Examples
///
/// ```rust
/// use stackcfg::adapters::YamlParser;
/// use stackcfg::ports::ConfigParser;
///
/// let parser = YamlParser::new();
/// let yaml = "config:\n  vpc:nat_strategy: single\n  oidc:\n    issuer_url: https://issuer";
/// let result = parser.parse(yaml).unwrap();
/// assert_eq!(result.get("vpc:nat_strategy"), Some(&"single".to_string()));
/// assert_eq!(result.get("oidc:issuer_url"), Some(&"https://issuer".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    fn join(prefix: &str, key: &str) -> String {
        if prefix.is_empty() {
            key.to_string()
        } else if prefix.contains(':') {
            format!("{}.{}", prefix, key)
        } else {
            format!("{}:{}", prefix, key)
        }
    }

    fn scalar(value: &serde_yaml::Value) -> Option<String> {
        match value {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn flatten(value: &serde_yaml::Value, prefix: &str, result: &mut HashMap<String, String>) {
        match value {
            serde_yaml::Value::Mapping(map) => {
                for (key, val) in map {
                    if let Some(key_str) = key.as_str() {
                        Self::flatten(val, &Self::join(prefix, key_str), result);
                    }
                }
            }
            serde_yaml::Value::Sequence(seq) => {
                let items: Vec<String> = seq.iter().filter_map(Self::scalar).collect();
                result.insert(prefix.to_string(), items.join(","));
            }
            serde_yaml::Value::Null => {
                tracing::debug!("Skipping null stack config value '{}'", prefix);
            }
            serde_yaml::Value::Tagged(tagged) => Self::flatten(&tagged.value, prefix, result),
            other => {
                if let Some(s) = Self::scalar(other) {
                    result.insert(prefix.to_string(), s);
                }
            }
        }
    }
}

impl Default for YamlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let document: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| StackError::ParseError {
                message: format!("Failed to parse stack file YAML: {}", e),
                source: Some(Box::new(e)),
            })?;

        let mut result = HashMap::new();
        match document.get(CONFIG_SECTION) {
            Some(config @ serde_yaml::Value::Mapping(_)) => {
                Self::flatten(config, "", &mut result)
            }
            Some(serde_yaml::Value::Null) | None => {}
            Some(_) => {
                return Err(StackError::ParseError {
                    message: format!("'{}' section must be a mapping", CONFIG_SECTION),
                    source: None,
                })
            }
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

/// Configuration source adapter for a YAML stack file.
///
/// # Priority
///
/// Stack files have a priority of 1, so environment variables (2) and
/// command-line overrides (3) win over them.
///
/// # Examples
///
/// ```rust,no_run
/// use stackcfg::adapters::YamlFileAdapter;
///
/// let adapter = YamlFileAdapter::from_file("Pulumi.dev-vpc.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileAdapter {
    file_path: PathBuf,
    values: HashMap<String, String>,
}

impl YamlFileAdapter {
    /// Loads a stack file from a specific path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let display_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unknown>")
            .to_string();
        let source_error = |message: String, e: std::io::Error| StackError::SourceError {
            source_name: "stack-file".to_string(),
            message,
            source: Some(Box::new(e)),
        };

        let metadata = fs::metadata(&file_path)
            .map_err(|e| source_error(format!("Failed to read file metadata: {}", display_name), e))?;

        if metadata.len() > MAX_STACK_FILE_SIZE {
            return Err(StackError::SourceError {
                source_name: "stack-file".to_string(),
                message: format!(
                    "Stack file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_STACK_FILE_SIZE
                ),
                source: None,
            });
        }

        let content = fs::read_to_string(&file_path)
            .map_err(|e| source_error(format!("Failed to read stack file: {}", display_name), e))?;

        let values = YamlParser::new().parse(&content)?;
        tracing::debug!("Loaded {} keys from stack file '{}'", values.len(), display_name);

        Ok(Self { file_path, values })
    }

    /// The conventional file name for a stack, `Pulumi.<stack>.yaml`.
    pub fn file_name_for(stack: &StackIdentifier) -> String {
        format!("Pulumi.{}.yaml", stack)
    }

    /// Loads `Pulumi.<stack>.yaml` from `dir` if it exists.
    ///
    /// A missing file is `Ok(None)`; an unreadable or invalid one is an error.
    pub fn discover(dir: impl AsRef<Path>, stack: &StackIdentifier) -> Result<Option<Self>> {
        let path = dir.as_ref().join(Self::file_name_for(stack));
        if !path.is_file() {
            tracing::debug!("No stack file at {}", path.display());
            return Ok(None);
        }
        Self::from_file(path).map(Some)
    }

    /// Returns the path to the stack file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

impl ConfigSource for YamlFileAdapter {
    fn name(&self) -> &str {
        "stack-file"
    }

    fn priority(&self) -> u8 {
        1
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
