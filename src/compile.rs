//! Query assembly: parameters in, compiled query out.
//!
//! [`compile`] orchestrates the whole pipeline: every key is parsed and
//! validated, root constraints AND-compose onto a `TRUE`-rooted
//! conjunction, joined constraints are planned against the whitelist, and
//! ordering, limit and the id boundary come last. The first validation
//! failure is returned and no query value is constructed.
//!
//! # Examples
//!
//! ```rust
//! use sift::{compile, CompileOptions, Entity};
//!
//! let entity = Entity::new("User", "users");
//! let query = compile(
//!     "name[eq]=Alice&age[gte]=30&sort=-age",
//!     &entity,
//!     &CompileOptions::default(),
//! )
//! .unwrap();
//!
//! let (sql, params) = query.to_sql();
//! assert!(sql.contains("WHERE TRUE AND"));
//! assert!(sql.contains("name = $"));
//! assert!(sql.ends_with("ORDER BY age DESC LIMIT 10"));
//! assert_eq!(params.len(), 2);
//! ```

use std::fmt::Write;

use smol_str::SmolStr;
use tracing::debug;

use crate::constraint::compile_constraint;
use crate::error::{Error, Result};
use crate::join::{plan_joins, Join};
use crate::key::FieldRef;
use crate::params::IntoParams;
use crate::predicate::{ColumnExpr, Predicate};
use crate::schema::Entity;
use crate::types::{Boundary, OrderBy, SortOrder};
use crate::value::Value;

/// The limit applied when the caller supplies none.
pub const DEFAULT_LIMIT: u64 = 10;

/// Options controlling compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Associations joined filters may reference. Empty by default: every
    /// joined filter is rejected unless its association is listed here.
    pub joins: Vec<SmolStr>,
}

impl CompileOptions {
    /// Create options with an empty whitelist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whitelist the given associations for joining.
    pub fn with_joins<I, S>(mut self, joins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.joins = joins.into_iter().map(Into::into).collect();
        self
    }
}

/// A compiled query, ready to serialise to parameterised SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The root table.
    pub table: SmolStr,
    /// The primary-key column used by ordering defaults and boundaries.
    pub id_column: SmolStr,
    /// Conjunction of root-entity constraints.
    pub predicate: Predicate,
    /// Planned joins with their attached predicates.
    pub joins: Vec<Join>,
    /// Result ordering.
    pub order: OrderBy,
    /// Row limit.
    pub limit: u64,
    /// Optional id window from `start` / `-start`.
    pub boundary: Option<Boundary>,
}

impl Query {
    /// Serialise to a SELECT statement with `$N` placeholders.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::with_capacity(128);
        let mut params = Vec::new();

        let _ = write!(sql, "SELECT {table}.* FROM {table}", table = self.table);

        for join in &self.joins {
            sql.push(' ');
            join.write_sql(&mut sql, &self.table);
        }

        sql.push_str(" WHERE TRUE");
        if !self.predicate.is_true() {
            sql.push_str(" AND ");
            self.predicate.write_conjunction(&mut sql, &mut params);
        }
        for join in &self.joins {
            if !join.predicate.is_true() {
                sql.push_str(" AND ");
                join.predicate.write_conjunction(&mut sql, &mut params);
            }
        }
        if let Some(boundary) = &self.boundary {
            params.push(boundary.value().clone());
            let _ = write!(
                sql,
                " AND {}.{} {} ${}",
                self.table,
                self.id_column,
                boundary.as_cmp(),
                params.len()
            );
        }

        sql.push_str(" ORDER BY ");
        self.order.write_sql(&mut sql);
        let _ = write!(sql, " LIMIT {}", self.limit);

        (sql, params)
    }
}

/// Compile a parameter mapping (or raw query string) against an entity.
///
/// Filter keys become AND-composed predicates; joined filter keys are
/// grouped, deduplicated and checked against the whitelist in `options`;
/// the reserved control keys `sort`, `limit`, `start` and `-start` shape
/// ordering and the result window. Unrecognized keys are ignored. The
/// input is never mutated.
pub fn compile(input: impl IntoParams, entity: &Entity, options: &CompileOptions) -> Result<Query> {
    let params = input.into_params();
    debug!(entity = %entity.name, params = params.len(), "compiling query");

    // Sorted iteration keeps the emitted SQL reproducible; predicate order
    // carries no semantics.
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();

    let mut predicate = Predicate::True;
    for key in &keys {
        let column = match FieldRef::parse(key.as_str()) {
            FieldRef::Plain { field, op } => Some((ColumnExpr::plain(field), op)),
            FieldRef::Jsonb { field, key: json_key, op } => {
                Some((ColumnExpr::jsonb(field, json_key), op))
            }
            _ => None,
        };
        if let Some((column, op)) = column {
            let constraint = compile_constraint(column, &op, &params[key.as_str()], key.as_str())?;
            predicate = predicate.and_then(constraint);
        }
    }

    let joins = plan_joins(&params, entity, &options.joins)?;

    let order = parse_sort(params.get("sort"), &entity.id_column);
    let limit = parse_limit(params.get("limit"))?;
    let boundary = parse_boundary(params.get("start"), params.get("-start"))?;

    debug!(
        entity = %entity.name,
        joins = joins.len(),
        limit,
        "compiled query"
    );

    Ok(Query {
        table: entity.table.clone(),
        id_column: entity.id_column.clone(),
        predicate,
        joins,
        order,
        limit,
        boundary,
    })
}

/// Derive the ordering from the `sort` parameter.
///
/// Absent, empty, non-string or non-identifier values fall back to
/// ascending order on the id column. A leading `-` selects descending
/// order on the remainder.
fn parse_sort(value: Option<&Value>, id_column: &SmolStr) -> OrderBy {
    let Some(Value::String(raw)) = value else {
        return OrderBy::asc(id_column.clone());
    };
    let (order, field) = match raw.strip_prefix('-') {
        Some(rest) => (SortOrder::Desc, rest),
        None => (SortOrder::Asc, raw.as_str()),
    };
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return OrderBy::asc(id_column.clone());
    }
    OrderBy::new(field, order)
}

fn parse_limit(value: Option<&Value>) -> Result<u64> {
    match value {
        None => Ok(DEFAULT_LIMIT),
        Some(Value::Int(i)) if *i >= 0 => Ok(*i as u64),
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map_err(|_| Error::InvalidLimit { value: s.clone() }),
        Some(other) => Err(Error::InvalidLimit {
            value: other.to_string(),
        }),
    }
}

fn parse_boundary(start: Option<&Value>, before: Option<&Value>) -> Result<Option<Boundary>> {
    match (start, before) {
        (Some(start), Some(before)) => Err(Error::ConflictingBoundaries {
            start: start.to_string(),
            before: before.to_string(),
        }),
        (Some(start), None) => Ok(Some(Boundary::After(start.clone()))),
        (None, Some(before)) => Ok(Some(Boundary::Before(before.clone()))),
        (None, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::IntoParams;
    use crate::schema::Association;

    fn user() -> Entity {
        Entity::new("User", "users")
    }

    #[test]
    fn test_defaults_with_no_params() {
        let query = compile("", &user(), &CompileOptions::default()).unwrap();
        let (sql, params) = query.to_sql();
        assert_eq!(
            sql,
            "SELECT users.* FROM users WHERE TRUE ORDER BY id ASC LIMIT 10"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let query =
            compile("page=3&utm_source=mail", &user(), &CompileOptions::default()).unwrap();
        let (sql, params) = query.to_sql();
        assert!(!sql.contains("page"));
        assert!(!sql.contains("utm_source"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_sort_descending() {
        let query = compile("sort=-age", &user(), &CompileOptions::default()).unwrap();
        let (sql, _) = query.to_sql();
        assert!(sql.contains("ORDER BY age DESC"));
    }

    #[test]
    fn test_sort_invalid_falls_back_to_default() {
        for qs in ["sort=", "sort=-", "sort=a%20b", "sort=a.b"] {
            let query = compile(qs, &user(), &CompileOptions::default()).unwrap();
            let (sql, _) = query.to_sql();
            assert!(sql.contains("ORDER BY id ASC"), "query string {:?}", qs);
        }
    }

    #[test]
    fn test_limit_string_parsed() {
        let query = compile("limit=25", &user(), &CompileOptions::default()).unwrap();
        let (sql, _) = query.to_sql();
        assert!(sql.ends_with("LIMIT 25"));
    }

    #[test]
    fn test_limit_integer_passes_through() {
        let params = [("limit", Value::Int(7))].into_params();
        let query = compile(params, &user(), &CompileOptions::default()).unwrap();
        assert_eq!(query.limit, 7);
    }

    #[test]
    fn test_limit_parse_failure_is_an_error() {
        let err = compile("limit=ten", &user(), &CompileOptions::default()).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidLimit {
                value: "ten".into()
            }
        );
    }

    #[test]
    fn test_start_boundary() {
        let query = compile("start=40", &user(), &CompileOptions::default()).unwrap();
        let (sql, params) = query.to_sql();
        assert!(sql.contains("users.id > $1"));
        assert_eq!(params, vec![Value::String("40".into())]);
    }

    #[test]
    fn test_negated_start_boundary() {
        let query = compile("-start=40", &user(), &CompileOptions::default()).unwrap();
        let (sql, _) = query.to_sql();
        assert!(sql.contains("users.id < $1"));
    }

    #[test]
    fn test_both_boundaries_conflict() {
        let err = compile("start=10&-start=40", &user(), &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ConflictingBoundaries { .. }));
    }

    #[test]
    fn test_invalid_constraint_wins_over_query_construction() {
        let err = compile("name[like]=x", &user(), &CompileOptions::default()).unwrap_err();
        assert_eq!(err, Error::invalid_constraint("name[like]"));
    }

    #[test]
    fn test_join_predicates_come_after_root_predicates() {
        let entity = Entity::new("Video", "videos")
            .with_association(Association::new("current_version", "versions"));
        let options = CompileOptions::new().with_joins(["current_version"]);
        let query = compile(
            "asset_type[eq]=image&current_version:status[eq]=done",
            &entity,
            &options,
        )
        .unwrap();
        let (sql, params) = query.to_sql();
        assert!(sql.contains("asset_type = $1"));
        assert!(sql.contains("current_version.status = $2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_boundary_binds_after_filter_params() {
        let query =
            compile("age[gte]=30&start=40", &user(), &CompileOptions::default()).unwrap();
        let (sql, params) = query.to_sql();
        assert!(sql.contains("age >= $1"));
        assert!(sql.contains("users.id > $2"));
        assert_eq!(params.len(), 2);
    }
}
