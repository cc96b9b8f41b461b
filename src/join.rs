//! Join planning for association-qualified filters.
//!
//! All `assoc:field[op]` and `assoc:field.key[op]` parameters that share an
//! association collapse into a single inner join; their predicates attach
//! to the join's alias. Every referenced association must appear in the
//! caller-supplied whitelist and resolve on the entity, or the whole
//! compilation fails before any join is emitted.

use std::collections::BTreeMap;

use smol_str::SmolStr;
use tracing::debug;

use crate::constraint::compile_constraint;
use crate::error::{Error, Result};
use crate::key::FieldRef;
use crate::params::Params;
use crate::predicate::{ColumnExpr, Predicate};
use crate::schema::Entity;

/// A planned inner join with its attached predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// The association name, used as the join alias.
    pub assoc: SmolStr,
    /// The joined table.
    pub table: SmolStr,
    /// Join key column on the root table.
    pub owner_column: SmolStr,
    /// Join key column on the joined table.
    pub target_column: SmolStr,
    /// Conjunction of predicates over the join alias.
    pub predicate: Predicate,
}

impl Join {
    /// Write the join clause (without its predicates) to a buffer.
    pub fn write_sql(&self, buffer: &mut String, root_table: &str) {
        buffer.push_str("INNER JOIN ");
        buffer.push_str(&self.table);
        buffer.push_str(" AS ");
        buffer.push_str(&self.assoc);
        buffer.push_str(" ON ");
        buffer.push_str(root_table);
        buffer.push('.');
        buffer.push_str(&self.owner_column);
        buffer.push_str(" = ");
        buffer.push_str(&self.assoc);
        buffer.push('.');
        buffer.push_str(&self.target_column);
    }
}

/// Plan the joins for a parameter mapping.
///
/// Groups joined references by association, enforces the whitelist for
/// every group before anything is emitted, and produces exactly one
/// [`Join`] per referenced association. Groups are visited in name order
/// so output is deterministic; callers must not rely on the order.
pub fn plan_joins(params: &Params, entity: &Entity, whitelist: &[SmolStr]) -> Result<Vec<Join>> {
    let mut groups: BTreeMap<SmolStr, Vec<(&String, ColumnExpr, SmolStr)>> = BTreeMap::new();

    for (key, _) in params.iter() {
        match FieldRef::parse(key) {
            FieldRef::Join { assoc, field, op } => {
                let column = ColumnExpr::plain(field).qualified(assoc.clone());
                groups.entry(assoc).or_default().push((key, column, op));
            }
            FieldRef::JoinJsonb {
                assoc,
                field,
                key: json_key,
                op,
            } => {
                let column = ColumnExpr::jsonb(field, json_key).qualified(assoc.clone());
                groups.entry(assoc).or_default().push((key, column, op));
            }
            _ => {}
        }
    }

    for assoc in groups.keys() {
        if !whitelist.iter().any(|allowed| allowed == assoc) {
            return Err(Error::join_not_allowed(assoc.as_str()));
        }
        if entity.association(assoc).is_none() {
            return Err(Error::join_not_allowed(assoc.as_str()));
        }
    }

    let mut joins = Vec::with_capacity(groups.len());
    for (assoc, refs) in groups {
        let association = entity
            .association(&assoc)
            .expect("association checked above");

        let mut predicate = Predicate::True;
        for (key, column, op) in refs {
            let value = &params[key.as_str()];
            predicate = predicate.and_then(compile_constraint(column, &op, value, key)?);
        }

        debug!(assoc = %assoc, table = %association.table, "planned join");
        joins.push(Join {
            assoc,
            table: association.table.clone(),
            owner_column: association.owner_column.clone(),
            target_column: association.target_column.clone(),
            predicate,
        });
    }

    Ok(joins)
}
