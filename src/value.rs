//! Bound-parameter values.
//!
//! Every parameter value flowing through the compiler — whether it came out
//! of a decoded query string or was substituted by a mapper callback — is a
//! [`Value`]. Compiled queries bind these as parameters; SQL text never
//! interpolates them.
//!
//! # Examples
//!
//! ```rust
//! use sift::Value;
//!
//! // From integers
//! let val: Value = 42.into();
//!
//! // From strings
//! let val: Value = "hello".into();
//! let val: Value = String::from("world").into();
//!
//! // From booleans and floats
//! let val: Value = true.into();
//! let val: Value = 3.14f64.into();
//!
//! // From Option (Some becomes the value, None becomes Null)
//! let val: Value = Some(42).into();
//! let val: Value = Option::<i32>::None.into();
//! assert!(val.is_null());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parameter value bound into a compiled query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// JSON value.
    Json(serde_json::Value),
    /// List of values.
    List(Vec<Value>),
}

impl Value {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this is a null value or an empty string.
    ///
    /// The mapper uses this to decide whether a pair with a custom
    /// transformer should be dropped instead of transformed.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Null) || matches!(self, Self::String(s) if s.is_empty())
    }

    /// Borrow the string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::Json(v) => write!(f, "{}", v),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(3.5f64), Value::Float(3.5));
    }

    #[test]
    fn test_value_from_option() {
        let val: Value = Some(7i64).into();
        assert_eq!(val, Value::Int(7));
        let val: Value = Option::<i32>::None.into();
        assert_eq!(val, Value::Null);
    }

    #[test]
    fn test_value_is_blank() {
        assert!(Value::Null.is_blank());
        assert!(Value::String(String::new()).is_blank());
        assert!(!Value::String("x".into()).is_blank());
        assert!(!Value::Int(0).is_blank());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(5).to_string(), "5");
        assert_eq!(Value::String("a".into()).to_string(), "a");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "1,2"
        );
    }
}
