//! Error types for option resolution.
//!
//! Every failure mode of the pipeline maps to one variant:
//! - `InvalidParameter`: a builder call was given a malformed argument
//! - `UndefinedOption`: input contained a key the schema never declared
//! - `MissingOption`: a required key had no value after defaulting
//! - `InvalidType`: a value did not match its declared type tag(s)
//! - `InvalidValue`: a value was outside its declared allowed set

use thiserror::Error;

/// Result type for resolver operations
pub type ResolveResult<T> = Result<T, ResolverError>;

/// Errors raised while building a schema or resolving options against it.
///
/// A failed `resolve` leaves the schema untouched; callers may retry with
/// corrected input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolverError {
    /// A builder method was called with an argument it cannot accept
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input contained a key that is not in the defined set
    #[error("Undefined option '{key}'. Defined options: {defined}")]
    UndefinedOption {
        /// The offending input key
        key: String,
        /// All defined keys, comma separated, in declaration order
        defined: String,
    },

    /// A required key is absent (or null) after defaults were applied
    #[error("Missing required option '{key}'")]
    MissingOption {
        /// The required key that was not supplied
        key: String,
    },

    /// A value's runtime type does not match its declared type tag(s)
    #[error("Invalid type for option '{key}': expected {expected}, got {actual}")]
    InvalidType {
        /// The constrained key
        key: String,
        /// The declared tag, or tags joined with " or "
        expected: String,
        /// The JSON type name of the value actually supplied
        actual: String,
    },

    /// A value is not among its declared allowed values
    #[error("Invalid value {actual} for option '{key}': accepted values are {accepted}")]
    InvalidValue {
        /// The constrained key
        key: String,
        /// The rejected value, rendered as JSON
        actual: String,
        /// Description of the accepted set, literal, or predicate
        accepted: String,
    },
}

impl ResolverError {
    /// Returns the option key this error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ResolverError::InvalidParameter(_) => None,
            ResolverError::UndefinedOption { key, .. }
            | ResolverError::MissingOption { key }
            | ResolverError::InvalidType { key, .. }
            | ResolverError::InvalidValue { key, .. } => Some(key),
        }
    }
}
