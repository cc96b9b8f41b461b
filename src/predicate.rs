//! Predicate fragments and their SQL serialisation.
//!
//! A [`Predicate`] is a composable boolean expression over column
//! expressions; compilation AND-composes one per filter parameter. Values
//! are never interpolated into SQL text — serialisation emits `$N`
//! placeholders and collects the values alongside.
//!
//! # Examples
//!
//! ```rust
//! use sift::{ColumnExpr, Predicate, Value};
//!
//! let pred = Predicate::Eq(ColumnExpr::plain("name"), Value::String("Alice".into()));
//! let (sql, params) = pred.to_sql();
//! assert_eq!(sql, "name = $1");
//! assert_eq!(params, vec![Value::String("Alice".into())]);
//! ```

use smol_str::SmolStr;
use std::fmt::Write;
use tracing::debug;

use crate::value::Value;

/// A column expression: an optionally join-qualified column with an
/// optional JSON subscript.
///
/// Renders as `field`, `alias.field`, `field->>'key'` or
/// `alias.field->>'key'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnExpr {
    /// Join alias qualifying the column; root columns are unqualified.
    pub qualifier: Option<SmolStr>,
    /// The column name.
    pub field: SmolStr,
    /// JSON document key extracted with `->>`.
    pub json_key: Option<SmolStr>,
}

impl ColumnExpr {
    /// A direct column on the root entity.
    pub fn plain(field: impl Into<SmolStr>) -> Self {
        Self {
            qualifier: None,
            field: field.into(),
            json_key: None,
        }
    }

    /// A JSON key inside a document column on the root entity.
    pub fn jsonb(field: impl Into<SmolStr>, key: impl Into<SmolStr>) -> Self {
        Self {
            qualifier: None,
            field: field.into(),
            json_key: Some(key.into()),
        }
    }

    /// Qualify this column with a join alias.
    pub fn qualified(mut self, alias: impl Into<SmolStr>) -> Self {
        self.qualifier = Some(alias.into());
        self
    }

    /// Write the column expression to a buffer.
    pub fn write_sql(&self, buffer: &mut String) {
        if let Some(qualifier) = &self.qualifier {
            buffer.push_str(qualifier);
            buffer.push('.');
        }
        buffer.push_str(&self.field);
        if let Some(key) = &self.json_key {
            buffer.push_str("->>'");
            buffer.push_str(key);
            buffer.push('\'');
        }
    }
}

/// A composable boolean predicate fragment.
///
/// `True` is the trivial predicate the assembler roots its conjunction at;
/// it serialises to `TRUE` so that every further constraint appends as
/// `AND …`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Predicate {
    /// Always true; the empty conjunction.
    #[default]
    True,

    /// Equality comparison.
    Eq(ColumnExpr, Value),
    /// Inequality comparison.
    NotEq(ColumnExpr, Value),
    /// Less than.
    Lt(ColumnExpr, Value),
    /// Less than or equal.
    Lte(ColumnExpr, Value),
    /// Greater than.
    Gt(ColumnExpr, Value),
    /// Greater than or equal.
    Gte(ColumnExpr, Value),

    /// Case-insensitive substring match (`ILIKE '%value%'`).
    Contains(ColumnExpr, Value),
    /// Case-insensitive prefix match (`ILIKE 'value%'`).
    StartsWith(ColumnExpr, Value),
    /// Case-insensitive suffix match (`ILIKE '%value'`).
    EndsWith(ColumnExpr, Value),

    /// Boolean column is true.
    IsTrue(ColumnExpr),
    /// Boolean column is false.
    IsFalse(ColumnExpr),
    /// Null check.
    IsNull(ColumnExpr),
    /// Not-null check.
    IsNotNull(ColumnExpr),

    /// Membership in a list of values.
    In(ColumnExpr, Vec<Value>),

    /// Full-text match against a prefix tsquery.
    Search(ColumnExpr, String),

    /// Conjunction of predicates.
    And(Box<[Predicate]>),
}

impl Predicate {
    /// Check if this is the trivial predicate.
    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }

    /// AND-compose with another predicate.
    ///
    /// The trivial predicate is the identity; composing onto an existing
    /// conjunction extends it in place rather than nesting.
    pub fn and_then(self, other: Predicate) -> Self {
        if self.is_true() {
            return other;
        }
        if other.is_true() {
            return self;
        }
        match self {
            Self::And(parts) => {
                let mut parts: Vec<_> = parts.into_vec();
                parts.push(other);
                Self::And(parts.into_boxed_slice())
            }
            _ => Self::And(Box::new([self, other])),
        }
    }

    /// Create a conjunction from an iterator of predicates.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let parts: Vec<_> = predicates.into_iter().filter(|p| !p.is_true()).collect();
        let count = parts.len();
        let result = match count {
            0 => Self::True,
            1 => parts.into_iter().next().expect("one predicate"),
            _ => Self::And(parts.into_boxed_slice()),
        };
        debug!(count, "composed predicate conjunction");
        result
    }

    /// Serialise to SQL with `$N` placeholders and the bound values.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.write_sql(&mut sql, &mut params);
        (sql, params)
    }

    /// Write this predicate to a buffer, collecting bound values.
    ///
    /// Nested conjunctions are parenthesised; use [`write_conjunction`]
    /// for the flat top-level rendering of a WHERE clause.
    ///
    /// [`write_conjunction`]: Predicate::write_conjunction
    pub fn write_sql(&self, buffer: &mut String, params: &mut Vec<Value>) {
        match self {
            Self::True => buffer.push_str("TRUE"),

            Self::Eq(col, val) => Self::write_cmp(buffer, params, col, "=", val),
            Self::NotEq(col, val) => Self::write_cmp(buffer, params, col, "<>", val),
            Self::Lt(col, val) => Self::write_cmp(buffer, params, col, "<", val),
            Self::Lte(col, val) => Self::write_cmp(buffer, params, col, "<=", val),
            Self::Gt(col, val) => Self::write_cmp(buffer, params, col, ">", val),
            Self::Gte(col, val) => Self::write_cmp(buffer, params, col, ">=", val),

            Self::Contains(col, val) => {
                Self::write_ilike(buffer, params, col, val, true, true);
            }
            Self::StartsWith(col, val) => {
                Self::write_ilike(buffer, params, col, val, false, true);
            }
            Self::EndsWith(col, val) => {
                Self::write_ilike(buffer, params, col, val, true, false);
            }

            Self::IsTrue(col) => {
                col.write_sql(buffer);
                buffer.push_str(" = TRUE");
            }
            Self::IsFalse(col) => {
                col.write_sql(buffer);
                buffer.push_str(" = FALSE");
            }
            Self::IsNull(col) => {
                col.write_sql(buffer);
                buffer.push_str(" IS NULL");
            }
            Self::IsNotNull(col) => {
                col.write_sql(buffer);
                buffer.push_str(" IS NOT NULL");
            }

            Self::In(col, values) => {
                if values.is_empty() {
                    buffer.push_str("FALSE");
                    return;
                }
                col.write_sql(buffer);
                buffer.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        buffer.push_str(", ");
                    }
                    params.push(value.clone());
                    let _ = write!(buffer, "${}", params.len());
                }
                buffer.push(')');
            }

            Self::Search(col, query) => {
                col.write_sql(buffer);
                params.push(Value::String(query.clone()));
                let _ = write!(buffer, " @@ to_tsquery('simple', ${})", params.len());
            }

            Self::And(parts) => {
                if parts.is_empty() {
                    buffer.push_str("TRUE");
                    return;
                }
                buffer.push('(');
                self.write_conjunction(buffer, params);
                buffer.push(')');
            }
        }
    }

    /// Write a conjunction body joined with ` AND `, without outer parens.
    ///
    /// On a non-`And` predicate this writes the predicate itself, so a
    /// WHERE clause can always be rendered as `TRUE AND <conjunction>`.
    pub fn write_conjunction(&self, buffer: &mut String, params: &mut Vec<Value>) {
        match self {
            Self::And(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        buffer.push_str(" AND ");
                    }
                    part.write_sql(buffer, params);
                }
            }
            other => other.write_sql(buffer, params),
        }
    }

    fn write_cmp(
        buffer: &mut String,
        params: &mut Vec<Value>,
        col: &ColumnExpr,
        cmp: &str,
        val: &Value,
    ) {
        col.write_sql(buffer);
        params.push(val.clone());
        let _ = write!(buffer, " {} ${}", cmp, params.len());
    }

    fn write_ilike(
        buffer: &mut String,
        params: &mut Vec<Value>,
        col: &ColumnExpr,
        val: &Value,
        leading: bool,
        trailing: bool,
    ) {
        let mut pattern = String::new();
        if leading {
            pattern.push('%');
        }
        match val {
            Value::String(s) => pattern.push_str(s),
            other => {
                let _ = write!(pattern, "{}", other);
            }
        }
        if trailing {
            pattern.push('%');
        }
        col.write_sql(buffer);
        params.push(Value::String(pattern));
        let _ = write!(buffer, " ILIKE ${}", params.len());
    }
}
