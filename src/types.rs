//! Ordering and pagination types.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

use crate::value::Value;

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Ordering specification for a compiled query.
///
/// Compilation produces a single ordering column; `id ASC` when the caller
/// supplies no usable `sort` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The column to order by.
    pub column: SmolStr,
    /// The sort order.
    pub order: SortOrder,
}

impl OrderBy {
    /// Create a new ordering.
    pub fn new(column: impl Into<SmolStr>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    /// Ascending order on a column.
    pub fn asc(column: impl Into<SmolStr>) -> Self {
        Self::new(column, SortOrder::Asc)
    }

    /// Descending order on a column.
    pub fn desc(column: impl Into<SmolStr>) -> Self {
        Self::new(column, SortOrder::Desc)
    }

    /// Write the ORDER BY body (without the keyword) to a buffer.
    pub fn write_sql(&self, buffer: &mut String) {
        buffer.push_str(&self.column);
        buffer.push(' ');
        buffer.push_str(self.order.as_sql());
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::asc("id")
    }
}

/// An id-window boundary derived from the `start` / `-start` parameters.
///
/// `After` selects rows with `id` greater than the bound value, `Before`
/// rows with `id` less than it. The value is bound as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    /// Rows after the given id (`id > ?`).
    After(Value),
    /// Rows before the given id (`id < ?`).
    Before(Value),
}

impl Boundary {
    /// The comparison operator this boundary compiles to.
    pub fn as_cmp(&self) -> &'static str {
        match self {
            Self::After(_) => ">",
            Self::Before(_) => "<",
        }
    }

    /// The bound value.
    pub fn value(&self) -> &Value {
        match self {
            Self::After(v) | Self::Before(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_sql() {
        assert_eq!(SortOrder::Asc.as_sql(), "ASC");
        assert_eq!(SortOrder::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_order_by_default() {
        let order = OrderBy::default();
        let mut sql = String::new();
        order.write_sql(&mut sql);
        assert_eq!(sql, "id ASC");
    }

    #[test]
    fn test_order_by_desc() {
        let mut sql = String::new();
        OrderBy::desc("age").write_sql(&mut sql);
        assert_eq!(sql, "age DESC");
    }

    #[test]
    fn test_boundary_cmp() {
        assert_eq!(Boundary::After(Value::Int(5)).as_cmp(), ">");
        assert_eq!(Boundary::Before(Value::Int(5)).as_cmp(), "<");
    }
}
