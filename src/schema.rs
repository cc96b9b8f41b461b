//! Entity and association descriptions.
//!
//! The compiler does not reflect over a live database; callers describe the
//! target entity — its table and the associations joined filters may
//! reach — and the join planner resolves association names against it.
//!
//! # Examples
//!
//! ```rust
//! use sift::{Association, Entity};
//!
//! let entity = Entity::new("Video", "videos")
//!     .with_association(Association::new("current_version", "versions"))
//!     .with_association(
//!         Association::new("owner", "users").on("owner_id", "id"),
//!     );
//!
//! assert!(entity.association("current_version").is_some());
//! assert!(entity.association("payments").is_none());
//! ```

use serde::Serialize;
use smol_str::SmolStr;

/// A named relation from the root entity to another table.
///
/// The default join condition follows the `belongs_to` convention: the root
/// table carries `{name}_id` referencing the target's `id`. Use
/// [`on`](Association::on) when the key columns differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Association {
    /// The association name as it appears in parameter keys.
    pub name: SmolStr,
    /// The joined table.
    pub table: SmolStr,
    /// The join key column on the root table.
    pub owner_column: SmolStr,
    /// The join key column on the joined table.
    pub target_column: SmolStr,
}

impl Association {
    /// Create an association with `belongs_to`-shaped key defaults.
    pub fn new(name: impl Into<SmolStr>, table: impl Into<SmolStr>) -> Self {
        let name = name.into();
        let owner_column = SmolStr::from(format!("{}_id", name));
        Self {
            name,
            table: table.into(),
            owner_column,
            target_column: "id".into(),
        }
    }

    /// Override the join key columns (root side, target side).
    pub fn on(
        mut self,
        owner_column: impl Into<SmolStr>,
        target_column: impl Into<SmolStr>,
    ) -> Self {
        self.owner_column = owner_column.into();
        self.target_column = target_column.into();
        self
    }
}

/// The entity a parameter mapping compiles against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// Entity name, used in diagnostics.
    pub name: SmolStr,
    /// The root table.
    pub table: SmolStr,
    /// The primary-key column the sort default and id boundaries use.
    pub id_column: SmolStr,
    /// Associations reachable from this entity.
    pub associations: Vec<Association>,
}

impl Entity {
    /// Create an entity over a table.
    pub fn new(name: impl Into<SmolStr>, table: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            id_column: "id".into(),
            associations: Vec::new(),
        }
    }

    /// Add an association.
    pub fn with_association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    /// Override the primary-key column.
    pub fn with_id_column(mut self, column: impl Into<SmolStr>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Look up an association by name.
    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_belongs_to_defaults() {
        let assoc = Association::new("current_version", "versions");
        assert_eq!(assoc.owner_column, "current_version_id");
        assert_eq!(assoc.target_column, "id");
    }

    #[test]
    fn test_on_override() {
        let assoc = Association::new("versions", "versions").on("id", "video_id");
        assert_eq!(assoc.owner_column, "id");
        assert_eq!(assoc.target_column, "video_id");
    }

    #[test]
    fn test_association_lookup() {
        let entity = Entity::new("User", "users")
            .with_association(Association::new("profile", "profiles"));
        assert_eq!(entity.association("profile").map(|a| a.table.as_str()), Some("profiles"));
        assert!(entity.association("missing").is_none());
    }
}
