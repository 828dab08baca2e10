//! Resolver Invariant Tests
//!
//! End-to-end tests for the resolution pipeline:
//! - Unconstrained schemas resolve input unchanged
//! - Defaults fill absent keys only
//! - Required keys must be present and non-null after defaulting
//! - Undeclared keys are rejected with the defined set in the message
//! - Type and value constraints are enforced on final values
//! - Normalizers run last, in declaration order
//! - Resolution is repeatable and leaves the schema untouched

use options_resolver::{AllowedValues, OptionsResolver, ResolverError};
use serde_json::{json, Map, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn as_map(entries: Value) -> Map<String, Value> {
    match entries {
        Value::Object(map) => map,
        _ => panic!("test input must be an object"),
    }
}

// =============================================================================
// Identity and Empty Input
// =============================================================================

/// A schema with no constraints beyond key declarations returns the input
/// unchanged.
#[test]
fn test_unconstrained_schema_is_identity() {
    let mut resolver = OptionsResolver::new();
    resolver.set_defined(["a", "b", "c"]);

    let input = as_map(json!({"a": 1, "b": "two", "c": [3]}));
    let resolved = resolver.resolve(input.clone()).unwrap();
    assert_eq!(resolved, input);
}

/// Resolving with no input yields an empty map when nothing is defaulted.
#[test]
fn test_empty_resolve_yields_empty_map() {
    let resolver = OptionsResolver::new();
    let resolved = resolver.resolve_empty().unwrap();
    assert!(resolved.is_empty());
}

// =============================================================================
// Defaults
// =============================================================================

/// An omitted key receives its default.
#[test]
fn test_default_fills_omitted_key() {
    let mut resolver = OptionsResolver::new();
    resolver.set_default("timeout", json!(30));

    let resolved = resolver.resolve_empty().unwrap();
    assert_eq!(resolved["timeout"], json!(30));
}

/// Caller-supplied zero, empty string, and false are legitimate values and
/// are not overwritten by defaults.
#[test]
fn test_falsy_values_survive_defaulting() {
    let mut resolver = OptionsResolver::new();
    resolver
        .set_defaults(json!({"count": 10, "label": "default", "verbose": true}))
        .unwrap();

    let resolved = resolver
        .resolve(as_map(json!({"count": 0, "label": "", "verbose": false})))
        .unwrap();
    assert_eq!(resolved["count"], json!(0));
    assert_eq!(resolved["label"], json!(""));
    assert_eq!(resolved["verbose"], json!(false));
}

// =============================================================================
// Required Keys
// =============================================================================

/// A required key supplied by the caller passes.
#[test]
fn test_required_key_supplied() {
    let mut resolver = OptionsResolver::new();
    resolver.set_required("id");

    let resolved = resolver.resolve(as_map(json!({"id": "u1"}))).unwrap();
    assert_eq!(resolved["id"], json!("u1"));
}

/// A required key absent after defaulting fails with MissingOption.
#[test]
fn test_required_key_absent_fails() {
    let mut resolver = OptionsResolver::new();
    resolver.set_required("id");

    let err = resolver.resolve_empty().unwrap_err();
    assert_eq!(err, ResolverError::MissingOption { key: "id".into() });
}

/// A required key satisfied by a default passes.
#[test]
fn test_required_key_satisfied_by_default() {
    let mut resolver = OptionsResolver::new();
    resolver.set_required("mode").set_default("mode", json!("fast"));

    let resolved = resolver.resolve_empty().unwrap();
    assert_eq!(resolved["mode"], json!("fast"));
}

// =============================================================================
// Undeclared Keys
// =============================================================================

/// Supplying an undeclared key fails, and the message lists the defined set.
#[test]
fn test_undeclared_key_rejected() {
    let mut resolver = OptionsResolver::new();
    resolver.set_defined(["width", "height"]);

    let err = resolver.resolve(as_map(json!({"depth": 3}))).unwrap_err();
    let message = format!("{}", err);
    assert!(message.contains("'depth'"));
    assert!(message.contains("width"));
    assert!(message.contains("height"));
}

// =============================================================================
// Repeatability
// =============================================================================

/// Resolving the same input twice against the same schema yields the same
/// result; no state accumulates across calls.
#[test]
fn test_resolution_is_repeatable() {
    let mut resolver = OptionsResolver::new();
    resolver
        .set_required("id")
        .set_default("retries", json!(3))
        .set_normalizer("id", |_, v| json!(v.as_str().unwrap_or_default().trim()));

    let input = as_map(json!({"id": "  u1  "}));
    let first = resolver.resolve(input.clone()).unwrap();
    let second = resolver.resolve(input).unwrap();
    assert_eq!(first, second);
    assert_eq!(first["id"], json!("u1"));
    assert_eq!(first["retries"], json!(3));
}

/// A failed resolution leaves the schema usable for a corrected retry.
#[test]
fn test_schema_undisturbed_after_failure() {
    let mut resolver = OptionsResolver::new();
    resolver.set_required("id").set_default("mode", json!("fast"));

    assert!(resolver.resolve_empty().is_err());

    let resolved = resolver.resolve(as_map(json!({"id": "u1"}))).unwrap();
    assert_eq!(resolved["id"], json!("u1"));
    assert_eq!(resolved["mode"], json!("fast"));
}

// =============================================================================
// Type Checks
// =============================================================================

/// A string where an int is declared fails; an int passes.
#[test]
fn test_int_type_check() {
    let mut resolver = OptionsResolver::new();
    resolver.set_defined("count").set_allowed_types("count", "int");

    let err = resolver.resolve(as_map(json!({"count": "abc"}))).unwrap_err();
    assert_eq!(
        err,
        ResolverError::InvalidType {
            key: "count".into(),
            expected: "int".into(),
            actual: "string".into(),
        }
    );

    let resolved = resolver.resolve(as_map(json!({"count": 5}))).unwrap();
    assert_eq!(resolved["count"], json!(5));
}

/// Type constraints apply to defaulted values too.
#[test]
fn test_type_check_applies_to_defaults() {
    let mut resolver = OptionsResolver::new();
    resolver
        .set_default("limit", json!("unbounded"))
        .set_allowed_types("limit", "int");

    let err = resolver.resolve_empty().unwrap_err();
    assert!(matches!(err, ResolverError::InvalidType { .. }));
}

/// A regexp-typed option accepts compiling patterns and rejects broken ones.
#[test]
fn test_regexp_type_check() {
    let mut resolver = OptionsResolver::new();
    resolver.set_defined("filter").set_allowed_types("filter", "regexp");

    assert!(resolver.resolve(as_map(json!({"filter": "^ab?c$"}))).is_ok());
    let err = resolver.resolve(as_map(json!({"filter": "(oops"}))).unwrap_err();
    assert!(matches!(err, ResolverError::InvalidType { .. }));
}

// =============================================================================
// Value Checks
// =============================================================================

/// A value outside the allowed set fails with the accepted values listed;
/// a member of the set passes.
#[test]
fn test_allowed_values_set() {
    let mut resolver = OptionsResolver::new();
    resolver.set_defined("mode").set_allowed_values("mode", vec!["a", "b"]);

    let err = resolver.resolve(as_map(json!({"mode": "c"}))).unwrap_err();
    let message = format!("{}", err);
    assert!(message.contains("\"a\""));
    assert!(message.contains("\"b\""));

    let resolved = resolver.resolve(as_map(json!({"mode": "a"}))).unwrap();
    assert_eq!(resolved["mode"], json!("a"));
}

/// A predicate constraint decides acceptance.
#[test]
fn test_allowed_values_predicate() {
    let mut resolver = OptionsResolver::new();
    resolver.set_defined("threshold").set_allowed_values(
        "threshold",
        AllowedValues::predicate(|v| v.as_f64().map(|n| (0.0..=1.0).contains(&n)).unwrap_or(false)),
    );

    assert!(resolver.resolve(as_map(json!({"threshold": 0.5}))).is_ok());
    assert!(resolver.resolve(as_map(json!({"threshold": 1.5}))).is_err());
}

// =============================================================================
// Normalizers
// =============================================================================

/// A normalizer transforms the defaulted value into the final one.
#[test]
fn test_normalizer_on_defaulted_value() {
    let mut resolver = OptionsResolver::new();
    resolver.set_default("name", json!("x")).set_normalizer("name", |_, v| {
        json!(v.as_str().unwrap_or_default().to_uppercase())
    });

    let resolved = resolver.resolve_empty().unwrap();
    assert_eq!(resolved["name"], json!("X"));
}

/// A later normalizer observes the output of an earlier one.
#[test]
fn test_normalizers_see_partially_normalized_map() {
    let mut resolver = OptionsResolver::new();
    resolver
        .set_defaults(json!({"base": "srv", "addr": ""}))
        .unwrap()
        .set_normalizer("base", |_, v| {
            json!(format!("{}.local", v.as_str().unwrap_or_default()))
        })
        .set_normalizer("addr", |all, _| {
            json!(format!("https://{}", all["base"].as_str().unwrap_or_default()))
        });

    let resolved = resolver.resolve_empty().unwrap();
    assert_eq!(resolved["addr"], json!("https://srv.local"));
}

// =============================================================================
// End to End
// =============================================================================

/// Required id, defaulted and typed timeout: the documented scenario.
#[test]
fn test_end_to_end_id_and_timeout() {
    let mut resolver = OptionsResolver::new();
    resolver
        .set_required("id")
        .set_default("timeout", json!(30))
        .set_allowed_types("timeout", "int");

    let resolved = resolver.resolve(as_map(json!({"id": "u1"}))).unwrap();
    assert_eq!(resolved["id"], json!("u1"));
    assert_eq!(resolved["timeout"], json!(30));

    let err = resolver.resolve_empty().unwrap_err();
    assert!(format!("{}", err).contains("'id'"));
}

/// Every stage in one schema: reject, default, require, type, value,
/// normalize.
#[test]
fn test_full_pipeline() {
    let mut resolver = OptionsResolver::new();
    resolver
        .set_required("user")
        .set_defined("tags")
        .set_default("level", json!("info"))
        .set_allowed_types("tags", "array")
        .set_allowed_values("level", vec!["debug", "info", "warn"])
        .set_normalizer("user", |_, v| {
            json!(v.as_str().unwrap_or_default().to_lowercase())
        });

    let resolved = resolver
        .resolve(as_map(json!({"user": "Alice", "tags": ["a"]})))
        .unwrap();
    assert_eq!(resolved["user"], json!("alice"));
    assert_eq!(resolved["level"], json!("info"));
    assert_eq!(resolved["tags"], json!(["a"]));

    // Stage order: an undefined key is reported before the missing
    // required key.
    let err = resolver.resolve(as_map(json!({"bogus": 1}))).unwrap_err();
    assert!(matches!(err, ResolverError::UndefinedOption { .. }));
}
