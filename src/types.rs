//! Schema building blocks: type tags, value constraints, normalizers.
//!
//! Supported type tags:
//! - string: JSON string
//! - int: JSON integer
//! - float: JSON number with a fractional part
//! - bool (alias: boolean): JSON boolean
//! - array: JSON array
//! - object: JSON object
//! - regexp: JSON string that compiles as a regular expression
//!
//! Tags are matched case-insensitively. Unrecognized tags (including the
//! callable tags fn/func/function, which no JSON value can satisfy) are
//! skipped at resolution time rather than rejected.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Recognized option value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// UTF-8 string
    String,
    /// Integer (no fractional part)
    Int,
    /// Boolean
    Bool,
    /// Number with a fractional part
    Float,
    /// Key-value mapping
    Object,
    /// Ordered sequence
    Array,
    /// String compiling as a regular expression
    Regexp,
}

impl OptionType {
    /// Parses a type tag, honoring aliases and ignoring case.
    ///
    /// Returns `None` for tags with no JSON representation (`fn`, `func`,
    /// `function`) and for anything unrecognized; the type check skips
    /// such tags.
    pub fn parse(tag: &str) -> Option<OptionType> {
        match tag.to_ascii_lowercase().as_str() {
            "string" => Some(OptionType::String),
            "int" => Some(OptionType::Int),
            "bool" | "boolean" => Some(OptionType::Bool),
            "float" => Some(OptionType::Float),
            "object" => Some(OptionType::Object),
            "array" => Some(OptionType::Array),
            "regexp" => Some(OptionType::Regexp),
            _ => None,
        }
    }

    /// Returns the tag name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionType::String => "string",
            OptionType::Int => "int",
            OptionType::Bool => "bool",
            OptionType::Float => "float",
            OptionType::Object => "object",
            OptionType::Array => "array",
            OptionType::Regexp => "regexp",
        }
    }

    /// Checks whether a value satisfies this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            OptionType::String => value.is_string(),
            OptionType::Int => value.is_i64() || value.is_u64(),
            OptionType::Bool => value.is_boolean(),
            OptionType::Float => value.is_f64(),
            OptionType::Object => value.is_object(),
            OptionType::Array => value.is_array(),
            OptionType::Regexp => value
                .as_str()
                .map(|s| Regex::new(s).is_ok())
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Predicate form of a value constraint
pub type ValuePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Normalizer function: receives the full resolved map and the current
/// value for its key, returns the replacement value.
pub type Normalizer = Arc<dyn Fn(&Map<String, Value>, Value) -> Value + Send + Sync>;

/// Allowed-value constraint for one option key.
///
/// Either a single acceptable literal, a set of acceptable literals, or a
/// predicate deciding acceptability.
#[derive(Clone)]
pub enum AllowedValues {
    /// Exactly one acceptable literal
    One(Value),
    /// Any member of the set is acceptable
    Any(Vec<Value>),
    /// The predicate decides
    Predicate(ValuePredicate),
}

impl AllowedValues {
    /// Builds the predicate form from a closure.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        AllowedValues::Predicate(Arc::new(f))
    }

    /// Checks whether a value satisfies this constraint.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            AllowedValues::One(literal) => value == literal,
            AllowedValues::Any(literals) => literals.iter().any(|v| v == value),
            AllowedValues::Predicate(f) => f(value),
        }
    }

    /// Describes the accepted set for error messages.
    pub fn describe(&self) -> String {
        match self {
            AllowedValues::One(literal) => literal.to_string(),
            AllowedValues::Any(literals) => literals
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            AllowedValues::Predicate(_) => "values accepted by the configured predicate".into(),
        }
    }
}

impl fmt::Debug for AllowedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedValues::One(literal) => f.debug_tuple("One").field(literal).finish(),
            AllowedValues::Any(literals) => f.debug_tuple("Any").field(literals).finish(),
            AllowedValues::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<Value> for AllowedValues {
    fn from(literal: Value) -> Self {
        AllowedValues::One(literal)
    }
}

impl From<Vec<Value>> for AllowedValues {
    fn from(literals: Vec<Value>) -> Self {
        AllowedValues::Any(literals)
    }
}

impl<'a> From<&'a str> for AllowedValues {
    fn from(literal: &'a str) -> Self {
        AllowedValues::One(Value::String(literal.to_string()))
    }
}

impl<'a> From<Vec<&'a str>> for AllowedValues {
    fn from(literals: Vec<&'a str>) -> Self {
        AllowedValues::Any(literals.into_iter().map(|s| Value::String(s.into())).collect())
    }
}

/// One key or a list of keys, accepted wherever the builder takes either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany {
    /// A single entry
    One(String),
    /// Several entries, order preserved
    Many(Vec<String>),
}

impl OneOrMany {
    /// Flattens into a vector.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(key) => vec![key],
            OneOrMany::Many(keys) => keys,
        }
    }
}

impl<'a> From<&'a str> for OneOrMany {
    fn from(key: &'a str) -> Self {
        OneOrMany::One(key.to_string())
    }
}

impl From<String> for OneOrMany {
    fn from(key: String) -> Self {
        OneOrMany::One(key)
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(keys: Vec<String>) -> Self {
        OneOrMany::Many(keys)
    }
}

impl<'a> From<Vec<&'a str>> for OneOrMany {
    fn from(keys: Vec<&'a str>) -> Self {
        OneOrMany::Many(keys.into_iter().map(String::from).collect())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for OneOrMany {
    fn from(keys: [&'a str; N]) -> Self {
        OneOrMany::Many(keys.iter().map(|k| k.to_string()).collect())
    }
}

/// Returns the JSON type name of a value for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
