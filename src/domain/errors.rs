// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for stack dispatch and configuration resolution.
//!
//! Every failure the crate can surface is a variant of [`StackError`]. Errors are
//! always propagated to the caller; nothing in the crate retries or swallows them.

use std::num::ParseIntError;
use thiserror::Error;

/// The main error type for dispatch, resolution and provisioning.
///
/// # Examples
///
/// ```
/// use stackcfg::domain::errors::StackError;
///
/// fn require_issuer() -> Result<String, StackError> {
///     Err(StackError::MissingRequiredConfig {
///         key: "oidc:issuer_url".to_string(),
///         environment: "dev".to_string(),
///     })
/// }
///
/// assert!(require_issuer().is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StackError {
    /// The stack identifier is not of the form `<environment>-<component>`.
    #[error("Malformed stack identifier '{identifier}': {reason}")]
    MalformedStackIdentifier {
        /// The identifier as supplied
        identifier: String,
        /// Why it was rejected
        reason: String,
    },

    /// No provisioning module is registered under the parsed component name.
    #[error("Unknown component '{component}' (registered: {registered})")]
    UnknownComponent {
        /// The component that was requested
        component: String,
        /// Comma separated list of registered components
        registered: String,
    },

    /// A resolved value could not be coerced to the requested type.
    #[error("Configuration value '{value}' for key '{key}' is not a valid {target_type}")]
    ConfigTypeError {
        /// The key being resolved
        key: String,
        /// The offending value
        value: String,
        /// The requested type name
        target_type: String,
        /// The underlying conversion error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A required key resolved to nothing at every precedence level.
    #[error("Missing required configuration '{key}' for environment '{environment}'")]
    MissingRequiredConfig {
        /// The key that was required
        key: String,
        /// The environment being provisioned
        environment: String,
    },

    /// An error occurred in an explicit configuration source.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse a stack configuration file.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The resource engine rejected a declaration or query.
    #[error("Resource engine '{engine}' error: {message}")]
    EngineError {
        /// The engine that reported the failure
        engine: String,
        /// The error message
        message: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StackError {
    /// Creates a `ConfigTypeError` from a `ParseIntError`.
    pub fn from_parse_int_error(key: &str, value: &str, err: ParseIntError) -> Self {
        StackError::ConfigTypeError {
            key: key.to_string(),
            value: value.to_string(),
            target_type: "integer".to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Creates a `ConfigTypeError` without an underlying cause.
    pub fn invalid_value(key: &str, value: &str, target_type: &str) -> Self {
        StackError::ConfigTypeError {
            key: key.to_string(),
            value: value.to_string(),
            target_type: target_type.to_string(),
            source: None,
        }
    }

    /// Creates an `EngineError`.
    pub fn engine(engine: &str, message: impl Into<String>) -> Self {
        StackError::EngineError {
            engine: engine.to_string(),
            message: message.into(),
        }
    }

    /// Returns true for errors raised before any module is invoked.
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            StackError::MalformedStackIdentifier { .. } | StackError::UnknownComponent { .. }
        )
    }
}

/// A specialized Result type for stack operations.
pub type Result<T> = std::result::Result<T, StackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_identifier_error() {
        let error = StackError::MalformedStackIdentifier {
            identifier: "devvpc".to_string(),
            reason: "missing '-' separator".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed stack identifier 'devvpc': missing '-' separator"
        );
        assert!(error.is_dispatch_error());
    }

    #[test]
    fn test_unknown_component_error() {
        let error = StackError::UnknownComponent {
            component: "rds".to_string(),
            registered: "eks, iam, oidc, vpc".to_string(),
        };
        assert!(error.to_string().contains("rds"));
        assert!(error.to_string().contains("eks, iam, oidc, vpc"));
        assert!(error.is_dispatch_error());
    }

    #[test]
    fn test_from_parse_int_error() {
        let parse_err = "abc".parse::<i64>().unwrap_err();
        let error = StackError::from_parse_int_error("vpc:subnet_count", "abc", parse_err);
        assert!(matches!(error, StackError::ConfigTypeError { .. }));
        assert!(error.to_string().contains("integer"));
        assert!(error.to_string().contains("vpc:subnet_count"));
        assert!(!error.is_dispatch_error());
    }

    #[test]
    fn test_invalid_value() {
        let error = StackError::invalid_value("vpc:nat_strategy", "dual", "NAT strategy");
        assert_eq!(
            error.to_string(),
            "Configuration value 'dual' for key 'vpc:nat_strategy' is not a valid NAT strategy"
        );
    }

    #[test]
    fn test_missing_required_config() {
        let error = StackError::MissingRequiredConfig {
            key: "oidc:issuer_url".to_string(),
            environment: "prod".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Missing required configuration 'oidc:issuer_url' for environment 'prod'"
        );
    }

    #[test]
    fn test_source_error() {
        let error = StackError::SourceError {
            source_name: "env".to_string(),
            message: "Failed to read environment".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Configuration source 'env' error: Failed to read environment"
        );
    }

    #[test]
    fn test_engine_error() {
        let error = StackError::engine("plan", "duplicate resource name 'dev-vpc'");
        assert_eq!(
            error.to_string(),
            "Resource engine 'plan' error: duplicate resource name 'dev-vpc'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = StackError::from(io_error);
        assert!(matches!(error, StackError::IoError(_)));
    }
}
