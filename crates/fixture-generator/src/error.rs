//! Error types for fixture generation.

use fixture_core::{SchemaError, TypeParseError};

/// Error raised by a provider while producing a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// A constraint tag carries a missing or malformed parameter
    #[error("Invalid parameter '{param}' on tag '{tag}': {reason}")]
    InvalidParameter {
        tag: String,
        param: String,
        reason: String,
    },

    /// No string can satisfy the requested pattern
    #[error("Cannot generate a value matching pattern '{pattern}': {reason}")]
    UnsatisfiablePattern { pattern: String, reason: String },

    /// The provider was asked for a type it cannot produce
    #[error("Provider cannot produce type '{type_name}' (expected {expected})")]
    TypeMismatch { type_name: String, expected: String },

    /// Any other provider-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Error raised by a type introspector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntrospectionError {
    /// The name is not known to the introspector
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// The type exists but its structure cannot be described
    #[error("Cannot describe type '{type_name}': {reason}")]
    Unsupported { type_name: String, reason: String },
}

/// Error type for generation operations.
///
/// A failed generation never returns a partially populated instance.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The type has no accessible structure and no provider
    #[error("Unsupported type '{type_name}': {reason}")]
    UnsupportedType { type_name: String, reason: String },

    /// An abstract type has no concrete binding
    #[error("Unresolvable type '{type_name}' at '{path}': no concrete binding configured")]
    UnresolvableType { type_name: String, path: String },

    /// A registered provider failed
    #[error("Provider failed at '{path}' ({type_name}): {source}")]
    ProviderInvocation {
        path: String,
        type_name: String,
        #[source]
        source: ProviderError,
    },

    /// Converting a generated value into a caller type failed
    #[error("Failed to convert generated value: {0}")]
    Conversion(#[from] serde_json::Error),
}

impl From<IntrospectionError> for GenerationError {
    fn from(err: IntrospectionError) -> Self {
        match err {
            IntrospectionError::UnknownType(type_name) => Self::UnsupportedType {
                type_name,
                reason: "type is not known to the introspector".to_string(),
            },
            IntrospectionError::Unsupported { type_name, reason } => {
                Self::UnsupportedType { type_name, reason }
            }
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Start of a date range is after its end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// A binding target is not a valid type expression
    #[error("Invalid binding for '{name}': {source}")]
    InvalidBinding {
        name: String,
        #[source]
        source: TypeParseError,
    },

    /// An exclusion entry is malformed
    #[error("Invalid exclusion '{0}': expected 'field' or 'Type.field'")]
    InvalidExclusion(String),

    /// Schema referenced by the configuration failed to load
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
