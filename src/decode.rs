//! Query-string decoding.
//!
//! Turns the raw query portion of a URL into a [`Params`] mapping. Decoding
//! follows `application/x-www-form-urlencoded` rules: segments split on
//! `&`, each segment split on the first `=`, both halves percent-decoded,
//! `+` treated as a space.

use crate::params::Params;
use crate::value::Value;

/// Decode a raw URL query string into a parameter mapping.
///
/// An optional leading `?` is stripped. Repeated keys keep the last value
/// seen. The empty string decodes to an empty mapping.
///
/// # Examples
///
/// ```rust
/// use sift::{decode_query_string, Value};
///
/// let params = decode_query_string("?name%5Beq%5D=Alice+Smith&limit=5");
/// assert_eq!(params["name[eq]"], Value::String("Alice Smith".into()));
/// assert_eq!(params["limit"], Value::String("5".into()));
///
/// assert!(decode_query_string("").is_empty());
/// ```
pub fn decode_query_string(raw: &str) -> Params {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    if raw.is_empty() {
        return Params::new();
    }

    let mut params = Params::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        params.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() {
        assert!(decode_query_string("").is_empty());
        assert!(decode_query_string("?").is_empty());
    }

    #[test]
    fn test_leading_question_mark_stripped() {
        let params = decode_query_string("?a=1");
        assert_eq!(params["a"], Value::String("1".into()));
    }

    #[test]
    fn test_percent_decoding_both_sides() {
        let params = decode_query_string("name%5Bcontains%5D=caf%C3%A9");
        assert_eq!(params["name[contains]"], Value::String("café".into()));
    }

    #[test]
    fn test_plus_is_space() {
        let params = decode_query_string("q=bear+cat");
        assert_eq!(params["q"], Value::String("bear cat".into()));
    }

    #[test]
    fn test_missing_value_decodes_to_empty_string() {
        let params = decode_query_string("flag");
        assert_eq!(params["flag"], Value::String(String::new()));
    }

    #[test]
    fn test_first_equals_splits() {
        let params = decode_query_string("expr=a=b");
        assert_eq!(params["expr"], Value::String("a=b".into()));
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let params = decode_query_string("a=1&a=2&a=3");
        assert_eq!(params["a"], Value::String("3".into()));
    }
}
