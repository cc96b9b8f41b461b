//! Value transformation: rewrite parameter values before compilation.
//!
//! A [`MapperSpec`] maps logical field names — exact names or compiled
//! regex patterns — to transformer callbacks. [`map_safe`] walks a
//! parameter mapping, applies the matching transformer to each value and
//! either returns the fully rewritten mapping or the first failure; no
//! partially transformed mapping is ever observable. [`map`] is the
//! re-raising variant for pipelines that handle failures as panics.
//!
//! The canonical use is decoding opaque ids:
//!
//! ```rust
//! use sift::{map_safe, MapperSpec, Transformed, Value};
//!
//! let spec = MapperSpec::new().field("user_id", |v: Value| match v.as_str() {
//!     Some("valid_123") => Transformed::Value(Value::Int(123)),
//!     _ => Transformed::Error("Invalid hash".into()),
//! });
//!
//! let mapped = map_safe("user_id[eq]=valid_123", &spec).unwrap();
//! assert_eq!(mapped["user_id[eq]"], Value::Int(123));
//!
//! let err = map_safe("user_id[eq]=nope", &spec).unwrap_err();
//! assert!(err.to_string().contains("Invalid hash"));
//! ```

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::key::FieldRef;
use crate::params::{IntoParams, Params};
use crate::value::Value;

/// The outcome of a transformer callback.
///
/// Callbacks may return a bare [`Value`] or a `Result<Value, String>`;
/// both convert into this union at the registration boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
    /// Successful transformation carrying the new value.
    Value(Value),
    /// Failure with a reason reported back to the caller.
    Error(String),
}

impl From<Value> for Transformed {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<std::result::Result<Value, String>> for Transformed {
    fn from(r: std::result::Result<Value, String>) -> Self {
        match r {
            Ok(v) => Self::Value(v),
            Err(reason) => Self::Error(reason),
        }
    }
}

/// A boxed transformer callback.
pub type Transformer = Box<dyn Fn(Value) -> Transformed + Send + Sync>;

/// A mapping from field identifiers to transformer callbacks.
///
/// Lookup tries an exact name first, then scans pattern entries in
/// insertion order and takes the first match. A field matched by neither
/// keeps its value untouched — and, unlike a field with an explicitly
/// registered transformer, is never subject to the blank-value drop rule
/// of [`map_safe`].
#[derive(Default)]
pub struct MapperSpec {
    exact: HashMap<String, Transformer>,
    patterns: Vec<(Regex, Transformer)>,
}

impl MapperSpec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transformer for an exact logical field name.
    pub fn field<F, T>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> T + Send + Sync + 'static,
        T: Into<Transformed>,
    {
        self.exact.insert(name.into(), Box::new(move |v| f(v).into()));
        self
    }

    /// Register a transformer for every logical field matching a pattern.
    ///
    /// Patterns are scanned in registration order after exact lookup
    /// misses.
    pub fn pattern<F, T>(mut self, pattern: Regex, f: F) -> Self
    where
        F: Fn(Value) -> T + Send + Sync + 'static,
        T: Into<Transformed>,
    {
        self.patterns.push((pattern, Box::new(move |v| f(v).into())));
        self
    }

    /// Check whether the spec registers no transformers.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }

    /// Find the transformer for a logical field name.
    pub fn find(&self, field: &str) -> Option<&Transformer> {
        if let Some(t) = self.exact.get(field) {
            return Some(t);
        }
        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(field))
            .map(|(_, t)| t)
    }
}

impl std::fmt::Debug for MapperSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperSpec")
            .field("exact", &self.exact.keys().collect::<Vec<_>>())
            .field(
                "patterns",
                &self.patterns.iter().map(|(p, _)| p.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The logical field a mapper resolves a parameter key against.
///
/// Filter keys resolve to their schema-centric field name (for joined
/// references, the field on the associated entity); control keys resolve
/// to the key itself with one leading `-` stripped.
fn logical_field(key: &str) -> String {
    match FieldRef::parse(key) {
        FieldRef::None => key.strip_prefix('-').unwrap_or(key).to_string(),
        reference => reference
            .logical_field()
            .expect("filter references carry a field")
            .to_string(),
    }
}

/// Apply a mapper spec unconditionally; the re-raising variant.
///
/// Every pair is rewritten through its matching transformer (identity on a
/// miss) and recorded under its original key.
///
/// # Panics
///
/// Panics if a transformer reports failure or panics itself. Use
/// [`map_safe`] for the error-returning variant.
pub fn map(input: impl IntoParams, spec: &MapperSpec) -> Params {
    let params = input.into_params();
    let mut mapped = Params::with_capacity(params.len());
    for (key, value) in params {
        match spec.find(&logical_field(&key)) {
            None => {
                mapped.insert(key, value);
            }
            Some(transformer) => match transformer(value) {
                Transformed::Value(v) => {
                    mapped.insert(key, v);
                }
                Transformed::Error(reason) => panic!("transformation failed: {}", reason),
            },
        }
    }
    mapped
}

/// Apply a mapper spec, returning the first failure as an error.
///
/// Pairs whose value is null or the empty string and whose field has a
/// registered transformer are dropped without invoking it: opaque-id
/// decoders universally reject empty input, and dropping the pair spares
/// every caller the empty-guard. Transformer panics are caught and
/// converted into the failure reason. On any failure the walk
/// short-circuits and no partial mapping escapes.
pub fn map_safe(input: impl IntoParams, spec: &MapperSpec) -> Result<Params> {
    let params = input.into_params();
    let mut mapped = Params::with_capacity(params.len());
    for (key, value) in params {
        match spec.find(&logical_field(&key)) {
            None => {
                mapped.insert(key, value);
            }
            Some(transformer) => {
                if value.is_blank() {
                    debug!(key = %key, "dropped blank value with registered transformer");
                    continue;
                }
                match panic::catch_unwind(AssertUnwindSafe(|| transformer(value))) {
                    Ok(Transformed::Value(v)) => {
                        mapped.insert(key, v);
                    }
                    Ok(Transformed::Error(reason)) => {
                        warn!(key = %key, reason = %reason, "transformer reported failure");
                        return Err(Error::transformation_failed(reason));
                    }
                    Err(payload) => {
                        let reason = panic_message(payload);
                        warn!(key = %key, reason = %reason, "transformer panicked");
                        return Err(Error::transformation_failed(reason));
                    }
                }
            }
        }
    }
    Ok(mapped)
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "transformer panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::IntoParams;

    fn upcase(v: Value) -> Transformed {
        match v {
            Value::String(s) => Transformed::Value(Value::String(s.to_uppercase())),
            other => Transformed::Value(other),
        }
    }

    #[test]
    fn test_map_applies_exact_transformer() {
        let spec = MapperSpec::new().field("name", upcase);
        let mapped = map([("name[eq]", "alice"), ("age[gte]", "30")].into_params(), &spec);
        assert_eq!(mapped["name[eq]"], Value::String("ALICE".into()));
        assert_eq!(mapped["age[gte]"], Value::String("30".into()));
    }

    #[test]
    fn test_joined_key_resolves_non_association_field() {
        let spec = MapperSpec::new().field("flow_input", upcase);
        let mapped = map(
            [("current_version:flow_input.prompt[contains]", "cat")].into_params(),
            &spec,
        );
        assert_eq!(
            mapped["current_version:flow_input.prompt[contains]"],
            Value::String("CAT".into())
        );
    }

    #[test]
    fn test_control_key_resolution_strips_leading_dash() {
        assert_eq!(logical_field("-start"), "start");
        assert_eq!(logical_field("start"), "start");
        assert_eq!(logical_field("sort"), "sort");
        assert_eq!(logical_field("name[eq]"), "name");
    }

    #[test]
    fn test_negated_control_key_preserved_in_output() {
        let spec = MapperSpec::new().field("start", |v: Value| {
            Transformed::Value(Value::Int(v.as_str().unwrap().parse().unwrap()))
        });
        let mapped = map_safe([("-start", "40")].into_params(), &spec).unwrap();
        assert_eq!(mapped["-start"], Value::Int(40));
    }

    #[test]
    fn test_pattern_selected_in_insertion_order() {
        let spec = MapperSpec::new()
            .pattern(Regex::new("_id$").unwrap(), |_| {
                Transformed::Value(Value::Int(1))
            })
            .pattern(Regex::new("^user").unwrap(), |_| {
                Transformed::Value(Value::Int(2))
            });
        // "user_id" matches both; the first registered pattern wins.
        let mapped = map([("user_id[eq]", "x")].into_params(), &spec);
        assert_eq!(mapped["user_id[eq]"], Value::Int(1));
    }

    #[test]
    fn test_exact_wins_over_pattern() {
        let spec = MapperSpec::new()
            .pattern(Regex::new(".*").unwrap(), |_| {
                Transformed::Value(Value::Int(1))
            })
            .field("user_id", |_| Transformed::Value(Value::Int(2)));
        let mapped = map([("user_id[eq]", "x")].into_params(), &spec);
        assert_eq!(mapped["user_id[eq]"], Value::Int(2));
    }

    #[test]
    fn test_map_safe_identity_spec_round_trips() {
        let params = [("name[eq]", "Alice"), ("limit", "5")].into_params();
        let mapped = map_safe(params.clone(), &MapperSpec::new()).unwrap();
        assert_eq!(mapped, params);
    }

    #[test]
    fn test_map_safe_drops_blank_with_registered_transformer() {
        let spec = MapperSpec::new().field("flow_input", |_| -> Transformed {
            panic!("must never run");
        });
        let params = [
            ("current_version:flow_input.prompt[contains]", Value::String(String::new())),
            ("asset_type[eq]", Value::String("image".into())),
        ]
        .into_params();
        let mapped = map_safe(params, &spec).unwrap();
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped["asset_type[eq]"], Value::String("image".into()));
    }

    #[test]
    fn test_map_safe_keeps_blank_without_transformer() {
        let params = [("note[eq]", Value::String(String::new()))].into_params();
        let mapped = map_safe(params, &MapperSpec::new()).unwrap();
        assert_eq!(mapped["note[eq]"], Value::String(String::new()));
    }

    #[test]
    fn test_map_safe_reports_transformer_error() {
        let spec =
            MapperSpec::new().field("user_id", |_| Transformed::Error("Invalid hash".into()));
        let err = map_safe([("user_id[eq]", "zzz")].into_params(), &spec).unwrap_err();
        assert_eq!(err, Error::transformation_failed("Invalid hash"));
    }

    #[test]
    fn test_map_safe_catches_panics() {
        let spec = MapperSpec::new().field("user_id", |_| -> Transformed {
            panic!("Invalid hash");
        });
        let err = map_safe([("user_id[eq]", "zzz")].into_params(), &spec).unwrap_err();
        assert_eq!(err, Error::transformation_failed("Invalid hash"));
    }

    #[test]
    fn test_result_return_shape_converts() {
        let spec = MapperSpec::new().field("user_id", |v: Value| -> std::result::Result<Value, String> {
            match v.as_str() {
                Some("valid_123") => Ok(Value::Int(123)),
                _ => Err("Invalid hash".into()),
            }
        });
        let mapped = map_safe([("user_id[eq]", "valid_123")].into_params(), &spec).unwrap();
        assert_eq!(mapped["user_id[eq]"], Value::Int(123));
    }

    #[test]
    #[should_panic(expected = "transformation failed")]
    fn test_map_panics_on_failure() {
        let spec = MapperSpec::new().field("user_id", |_| Transformed::Error("nope".into()));
        map([("user_id[eq]", "x")].into_params(), &spec);
    }
}
