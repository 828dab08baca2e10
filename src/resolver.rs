//! Options resolver: schema builder surface and the resolution pipeline.
//!
//! Resolution runs a fixed sequence of passes over the input map:
//! 1. Deduplicate the defined keys (first occurrence wins)
//! 2. Reject input keys that were never defined
//! 3. Fill absent keys from defaults
//! 4. Reject required keys still absent or null
//! 5. Reject values failing their type tag(s)
//! 6. Reject values outside their allowed set
//! 7. Apply normalizers, in declaration order
//!
//! The first violation aborts resolution. `resolve` never mutates the
//! schema, so one configured resolver can serve concurrent resolutions.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::errors::{ResolveResult, ResolverError};
use crate::types::{json_type_name, AllowedValues, Normalizer, OneOrMany, OptionType};

/// Schema-holding resolver for option maps.
///
/// Built incrementally through chained setter calls, then applied to any
/// number of input maps via [`resolve`](OptionsResolver::resolve).
///
/// # Example
///
/// ```
/// use options_resolver::OptionsResolver;
/// use serde_json::{json, Map};
///
/// let mut resolver = OptionsResolver::new();
/// resolver
///     .set_required("id")
///     .set_default("timeout", json!(30))
///     .set_allowed_types("timeout", "int");
///
/// let mut input = Map::new();
/// input.insert("id".into(), json!("u1"));
/// let resolved = resolver.resolve(input).unwrap();
/// assert_eq!(resolved["timeout"], json!(30));
/// ```
#[derive(Default)]
pub struct OptionsResolver {
    /// Declared keys, in declaration order; may contain duplicates
    defined: Vec<String>,
    /// Keys that must be present and non-null after defaulting
    required: Vec<String>,
    /// Default values, applied to absent keys
    defaults: HashMap<String, Value>,
    /// Raw type tags per key; parsed lazily at resolution time
    allowed_types: HashMap<String, Vec<String>>,
    /// Allowed-value constraints per key
    allowed_values: HashMap<String, AllowedValues>,
    /// Normalizers, in declaration order
    normalizers: Vec<(String, Normalizer)>,
}

impl std::fmt::Debug for OptionsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsResolver")
            .field("defined", &self.defined)
            .field("required", &self.required)
            .field("defaults", &self.defaults)
            .field("allowed_types", &self.allowed_types)
            .field("allowed_values", &self.allowed_values)
            .field(
                "normalizers",
                &self.normalizers.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl OptionsResolver {
    /// Creates a resolver with an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================
    // Schema builder surface
    // ==================

    /// Declares one key or a list of keys as accepted input.
    pub fn set_defined(&mut self, keys: impl Into<OneOrMany>) -> &mut Self {
        self.defined.extend(keys.into().into_vec());
        self
    }

    /// Declares one key or a list of keys as required.
    ///
    /// Required keys are implicitly defined.
    pub fn set_required(&mut self, keys: impl Into<OneOrMany>) -> &mut Self {
        for key in keys.into().into_vec() {
            self.defined.push(key.clone());
            self.required.push(key);
        }
        self
    }

    /// Stores a default value for a key.
    ///
    /// A key with a default is implicitly defined.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        self.defined.push(key.clone());
        self.defaults.insert(key, value.into());
        self
    }

    /// Stores defaults for every entry of a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::InvalidParameter`] when the argument is not
    /// a JSON object.
    pub fn set_defaults(&mut self, mapping: Value) -> ResolveResult<&mut Self> {
        let entries = match mapping {
            Value::Object(entries) => entries,
            other => {
                return Err(ResolverError::InvalidParameter(format!(
                    "default values must be an object, got {}",
                    json_type_name(&other)
                )))
            }
        };
        for (key, value) in entries {
            self.set_default(key, value);
        }
        Ok(self)
    }

    /// Stores one type tag or a list of type tags for a key.
    ///
    /// A value passes the type check when it matches any recognized tag;
    /// unrecognized tags are skipped at resolution time.
    pub fn set_allowed_types(
        &mut self,
        key: impl Into<String>,
        tags: impl Into<OneOrMany>,
    ) -> &mut Self {
        self.allowed_types.insert(key.into(), tags.into().into_vec());
        self
    }

    /// Stores an allowed-value constraint for a key.
    ///
    /// Accepts a single literal, a list of literals, or
    /// [`AllowedValues::predicate`].
    pub fn set_allowed_values(
        &mut self,
        key: impl Into<String>,
        values: impl Into<AllowedValues>,
    ) -> &mut Self {
        self.allowed_values.insert(key.into(), values.into());
        self
    }

    /// Stores a normalizer for a key.
    ///
    /// The normalizer receives the full (possibly partially normalized) map
    /// and the current value for its key, and returns the replacement.
    /// Redeclaring a normalizer replaces the function but keeps the key's
    /// original position in the run order.
    pub fn set_normalizer<F>(&mut self, key: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Map<String, Value>, Value) -> Value + Send + Sync + 'static,
    {
        let key = key.into();
        let normalizer: Normalizer = Arc::new(f);
        match self.normalizers.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = normalizer,
            None => self.normalizers.push((key, normalizer)),
        }
        self
    }

    // ==================
    // Query accessors
    // ==================

    /// Returns the defined keys, in declaration order (duplicates included).
    pub fn defined_options(&self) -> &[String] {
        &self.defined
    }

    /// Returns the required keys, in declaration order.
    pub fn required_options(&self) -> &[String] {
        &self.required
    }

    /// Returns all stored defaults.
    pub fn default_values(&self) -> &HashMap<String, Value> {
        &self.defaults
    }

    /// Returns the stored default for one key.
    pub fn default_value(&self, key: &str) -> Option<&Value> {
        self.defaults.get(key)
    }

    /// Returns all stored type tags.
    pub fn allowed_types(&self) -> &HashMap<String, Vec<String>> {
        &self.allowed_types
    }

    /// Returns the stored type tags for one key.
    pub fn allowed_types_for(&self, key: &str) -> Option<&[String]> {
        self.allowed_types.get(key).map(Vec::as_slice)
    }

    /// Returns all stored value constraints.
    pub fn allowed_values(&self) -> &HashMap<String, AllowedValues> {
        &self.allowed_values
    }

    /// Returns the stored value constraint for one key.
    pub fn allowed_values_for(&self, key: &str) -> Option<&AllowedValues> {
        self.allowed_values.get(key)
    }

    /// Checks whether a key is required.
    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|k| k == key)
    }

    /// Checks whether no default is stored for a key.
    pub fn is_missing(&self, key: &str) -> bool {
        !self.defaults.contains_key(key)
    }

    /// Returns the required keys that have no stored default, in
    /// declaration order.
    pub fn missing_options(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|key| !self.defaults.contains_key(*key))
            .map(String::as_str)
            .collect()
    }

    // ==================
    // Resolution pipeline
    // ==================

    /// Resolves an input map against the schema.
    ///
    /// The map is augmented with defaults, validated, normalized, and
    /// returned. The schema is not mutated; a failed call may be retried.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in pipeline order:
    /// [`ResolverError::UndefinedOption`], [`ResolverError::MissingOption`],
    /// [`ResolverError::InvalidType`], or [`ResolverError::InvalidValue`].
    pub fn resolve(&self, mut options: Map<String, Value>) -> ResolveResult<Map<String, Value>> {
        debug!(input_keys = options.len(), "resolving options");

        let defined = self.deduped_defined();
        self.check_undefined(&options, &defined)?;
        self.apply_defaults(&mut options);
        self.check_required(&options)?;
        self.check_types(&options)?;
        self.check_values(&options)?;
        self.apply_normalizers(&mut options);

        trace!(resolved_keys = options.len(), "options resolved");
        Ok(options)
    }

    /// Resolves with no input, as if an empty map were supplied.
    pub fn resolve_empty(&self) -> ResolveResult<Map<String, Value>> {
        self.resolve(Map::new())
    }

    // ==================
    // Pipeline passes
    // ==================

    /// Defined keys with duplicates removed, first occurrence preserved.
    /// Computed per resolution; the stored schema keeps its duplicates.
    fn deduped_defined(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.defined
            .iter()
            .map(String::as_str)
            .filter(|key| seen.insert(*key))
            .collect()
    }

    /// Rejects input keys outside the defined set.
    fn check_undefined(&self, options: &Map<String, Value>, defined: &[&str]) -> ResolveResult<()> {
        let known: HashSet<&str> = defined.iter().copied().collect();
        for key in options.keys() {
            if !known.contains(key.as_str()) {
                return Err(ResolverError::UndefinedOption {
                    key: key.clone(),
                    defined: defined.join(", "),
                });
            }
        }
        Ok(())
    }

    /// Inserts defaults for keys absent from the input.
    ///
    /// Presence-based: caller-supplied 0, "", false, and explicit null are
    /// kept as-is rather than overwritten.
    fn apply_defaults(&self, options: &mut Map<String, Value>) {
        for (key, value) in &self.defaults {
            if !options.contains_key(key) {
                trace!(key = key.as_str(), "applying default");
                options.insert(key.clone(), value.clone());
            }
        }
    }

    /// Rejects required keys that are absent or null after defaulting.
    fn check_required(&self, options: &Map<String, Value>) -> ResolveResult<()> {
        for key in &self.required {
            match options.get(key) {
                Some(value) if !value.is_null() => {}
                _ => return Err(ResolverError::MissingOption { key: key.clone() }),
            }
        }
        Ok(())
    }

    /// Rejects values failing every recognized type tag for their key.
    fn check_types(&self, options: &Map<String, Value>) -> ResolveResult<()> {
        for (key, tags) in &self.allowed_types {
            let value = match options.get(key) {
                Some(value) => value,
                None => continue,
            };
            let recognized: Vec<OptionType> =
                tags.iter().filter_map(|tag| OptionType::parse(tag)).collect();
            if recognized.is_empty() {
                continue;
            }
            if !recognized.iter().any(|ty| ty.matches(value)) {
                return Err(ResolverError::InvalidType {
                    key: key.clone(),
                    expected: recognized
                        .iter()
                        .map(|ty| ty.type_name())
                        .collect::<Vec<_>>()
                        .join(" or "),
                    actual: json_type_name(value).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Rejects values outside their allowed set.
    fn check_values(&self, options: &Map<String, Value>) -> ResolveResult<()> {
        for (key, constraint) in &self.allowed_values {
            let value = match options.get(key) {
                Some(value) => value,
                None => continue,
            };
            if !constraint.admits(value) {
                return Err(ResolverError::InvalidValue {
                    key: key.clone(),
                    actual: value.to_string(),
                    accepted: constraint.describe(),
                });
            }
        }
        Ok(())
    }

    /// Runs normalizers in declaration order.
    ///
    /// Each normalizer sees the map as left by earlier normalizers, and the
    /// pre-normalization value of its own key. Keys absent from the map are
    /// skipped.
    fn apply_normalizers(&self, options: &mut Map<String, Value>) {
        for (key, normalizer) in &self.normalizers {
            let current = match options.get(key) {
                Some(value) => value.clone(),
                None => continue,
            };
            let replacement = normalizer(options, current);
            options.insert(key.clone(), replacement);
        }
    }
}
