//! Parameter mappings and the entry-point input currency.
//!
//! A [`Params`] is an unordered mapping from parameter key to [`Value`].
//! Every public entry point — [`compile`](crate::compile::compile),
//! [`map`](crate::mapper::map), [`map_safe`](crate::mapper::map_safe) and
//! [`filter`] — accepts anything implementing [`IntoParams`], so a raw query
//! string and an already-decoded mapping are interchangeable and the
//! functions chain:
//!
//! ```rust
//! use sift::{filter, map_safe, MapperSpec};
//!
//! let spec = MapperSpec::new();
//! let params = filter("name[eq]=Alice", [("tenant_id[eq]", "7")]);
//! let params = map_safe(params, &spec).unwrap();
//! assert_eq!(params.len(), 2);
//! ```

use std::collections::HashMap;

use crate::decode::decode_query_string;
use crate::value::Value;

/// An unordered mapping from parameter key to value.
pub type Params = HashMap<String, Value>;

/// Conversion into a [`Params`] mapping.
///
/// Implemented for query strings, existing mappings, and pair iterators.
/// Components never mutate their input; conversion always yields a fresh
/// mapping the callee owns.
pub trait IntoParams {
    /// Convert into a parameter mapping.
    fn into_params(self) -> Params;
}

impl IntoParams for Params {
    fn into_params(self) -> Params {
        self
    }
}

impl IntoParams for &Params {
    fn into_params(self) -> Params {
        self.clone()
    }
}

impl IntoParams for &str {
    fn into_params(self) -> Params {
        decode_query_string(self)
    }
}

impl IntoParams for String {
    fn into_params(self) -> Params {
        decode_query_string(&self)
    }
}

impl<K, V, const N: usize> IntoParams for [(K, V); N]
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_params(self) -> Params {
        self.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect()
    }
}

impl<K, V> IntoParams for Vec<(K, V)>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_params(self) -> Params {
        self.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect()
    }
}

/// Merge additional parameters over a base mapping, right-biased.
///
/// Keys present in `additional` win; everything else passes through from
/// `base`. Used to staple access-control predicates onto caller input
/// before compilation.
///
/// # Examples
///
/// ```rust
/// use sift::{filter, Value};
///
/// let merged = filter("status[eq]=draft&limit=5", [("status[eq]", "published")]);
/// assert_eq!(merged["status[eq]"], Value::String("published".into()));
/// assert_eq!(merged["limit"], Value::String("5".into()));
/// ```
pub fn filter(base: impl IntoParams, additional: impl IntoParams) -> Params {
    let mut merged = base.into_params();
    for (key, value) in additional.into_params() {
        merged.insert(key, value);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_right_biased() {
        let base = [("a", "1"), ("b", "2")].into_params();
        let merged = filter(base, [("b", "3"), ("c", "4")]);
        assert_eq!(merged["a"], Value::String("1".into()));
        assert_eq!(merged["b"], Value::String("3".into()));
        assert_eq!(merged["c"], Value::String("4".into()));
    }

    #[test]
    fn test_filter_accepts_query_string() {
        let merged = filter("a=1", [("b", "2")]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["a"], Value::String("1".into()));
    }

    #[test]
    fn test_filter_empty_additional_is_identity() {
        let base = [("a", "1")].into_params();
        let merged = filter(base.clone(), Params::new());
        assert_eq!(merged, base);
    }
}
