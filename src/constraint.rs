//! Constraint compilation: operator tokens to predicate fragments.
//!
//! The operator vocabulary is a closed set. Tokens outside it — and tokens
//! applied to a field shape that does not support them — yield
//! [`Error::InvalidConstraint`] carrying the original parameter key.

use crate::error::{Error, Result};
use crate::predicate::{ColumnExpr, Predicate};
use crate::value::Value;

/// A filter operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equality.
    Eq,
    /// Inequality.
    Neq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Case-insensitive substring match.
    Contains,
    /// Case-insensitive prefix match.
    StartsWith,
    /// Case-insensitive suffix match.
    EndsWith,
    /// Boolean column is true.
    True,
    /// Boolean column is false.
    False,
    /// Membership in a comma-separated list.
    In,
    /// Null / not-null check, selected by the value.
    Nil,
    /// Full-text prefix search.
    Search,
}

impl Op {
    /// Parse an operator token. Returns `None` outside the closed set.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "contains" => Some(Self::Contains),
            "starts_with" => Some(Self::StartsWith),
            "ends_with" => Some(Self::EndsWith),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "in" => Some(Self::In),
            "nil" => Some(Self::Nil),
            "search" => Some(Self::Search),
            _ => None,
        }
    }

    /// The canonical token for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::True => "true",
            Self::False => "false",
            Self::In => "in",
            Self::Nil => "nil",
            Self::Search => "search",
        }
    }
}

/// Compile one `(column, operator token, value)` triple into a predicate.
///
/// Dispatches on the column shape: JSON-subscripted columns support only
/// `eq`, `contains`, `starts_with` and `ends_with`; the operator set is
/// not widened beyond that. `key` is the original parameter key, reported
/// verbatim on failure.
pub fn compile_constraint(
    column: ColumnExpr,
    op_token: &str,
    value: &Value,
    key: &str,
) -> Result<Predicate> {
    let op = Op::parse(op_token).ok_or_else(|| Error::invalid_constraint(key))?;

    if column.json_key.is_some() {
        return match op {
            Op::Eq => Ok(Predicate::Eq(column, value.clone())),
            Op::Contains => Ok(Predicate::Contains(column, value.clone())),
            Op::StartsWith => Ok(Predicate::StartsWith(column, value.clone())),
            Op::EndsWith => Ok(Predicate::EndsWith(column, value.clone())),
            _ => Err(Error::invalid_constraint(key)),
        };
    }

    match op {
        Op::Eq => Ok(Predicate::Eq(column, value.clone())),
        Op::Neq => Ok(Predicate::NotEq(column, value.clone())),
        Op::Gt => Ok(Predicate::Gt(column, value.clone())),
        Op::Gte => Ok(Predicate::Gte(column, value.clone())),
        Op::Lt => Ok(Predicate::Lt(column, value.clone())),
        Op::Lte => Ok(Predicate::Lte(column, value.clone())),
        Op::Contains => Ok(Predicate::Contains(column, value.clone())),
        Op::StartsWith => Ok(Predicate::StartsWith(column, value.clone())),
        Op::EndsWith => Ok(Predicate::EndsWith(column, value.clone())),
        Op::True => Ok(Predicate::IsTrue(column)),
        Op::False => Ok(Predicate::IsFalse(column)),
        Op::Nil => match value {
            Value::String(s) if s == "true" => Ok(Predicate::IsNull(column)),
            Value::Bool(true) => Ok(Predicate::IsNull(column)),
            Value::String(s) if s == "false" => Ok(Predicate::IsNotNull(column)),
            Value::Bool(false) => Ok(Predicate::IsNotNull(column)),
            _ => Err(Error::invalid_constraint(key)),
        },
        Op::In => Ok(Predicate::In(column, split_in_list(value))),
        Op::Search => Ok(Predicate::Search(column, build_tsquery(value))),
    }
}

/// Tokenise an `in` value: split on `,` without trimming.
fn split_in_list(value: &Value) -> Vec<Value> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(|part| Value::String(part.to_string()))
            .collect(),
        Value::List(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Build a prefix tsquery: whitespace-split, drop empties, suffix each
/// token with `:*`, join with ` & `.
fn build_tsquery(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.split_whitespace()
        .map(|token| format!("{}:*", token))
        .collect::<Vec<_>>()
        .join(" & ")
}
