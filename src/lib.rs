//! options-resolver - schema-driven options validation and normalization
//!
//! Declare the keys an options map may carry, which are required, their
//! defaults, type tags, allowed values, and normalizers; then resolve any
//! caller-supplied map against that schema:
//!
//! - undeclared keys are rejected
//! - absent keys are filled from defaults
//! - required keys must end up present and non-null
//! - typed and constrained values are checked
//! - normalizers produce the final values
//!
//! Resolution is synchronous, all-or-nothing, and never mutates the schema.

mod errors;
mod resolver;
mod types;

pub use errors::{ResolveResult, ResolverError};
pub use resolver::OptionsResolver;
pub use types::{AllowedValues, Normalizer, OneOrMany, OptionType, ValuePredicate};
