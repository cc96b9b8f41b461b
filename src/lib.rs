//! # sift
//!
//! Compile HTTP-style query parameters into composable, parameterised SQL
//! queries against a declared entity.
//!
//! A caller hands in a parameter mapping — or the raw query string from a
//! URL — plus an entity description, and receives either a [`Query`] value
//! ready to serialise for a database driver, or a structured [`Error`].
//!
//! ## Filter keys
//!
//! Parameter keys carry the field, an optional association or JSON
//! subscript, and the operator:
//!
//! ```text
//! name[eq]=Alice                          direct column
//! options.prompt[contains]=motorbike      JSON document key
//! current_version:status[eq]=done         column via association
//! current_version:flow_input.prompt[contains]=cat
//! ```
//!
//! plus the reserved control keys `sort`, `limit`, `start` and `-start`.
//!
//! ## Compiling
//!
//! ```rust
//! use sift::{compile, CompileOptions, Association, Entity};
//!
//! let entity = Entity::new("Video", "videos")
//!     .with_association(Association::new("current_version", "versions"));
//!
//! let query = compile(
//!     "asset_type[eq]=image&current_version:status[eq]=done&sort=-id",
//!     &entity,
//!     &CompileOptions::new().with_joins(["current_version"]),
//! )
//! .unwrap();
//!
//! let (sql, params) = query.to_sql();
//! assert!(sql.contains("INNER JOIN versions AS current_version"));
//! assert!(sql.contains("asset_type = $1"));
//! assert_eq!(params.len(), 2);
//! ```
//!
//! Joined filters must name a whitelisted association; anything else fails
//! closed:
//!
//! ```rust
//! use sift::{compile, CompileOptions, Entity};
//!
//! let err = compile(
//!     "owner:name[eq]=Alice",
//!     &Entity::new("Video", "videos"),
//!     &CompileOptions::default(),
//! )
//! .unwrap_err();
//! assert_eq!(err.to_string(), "Join not allowed: owner");
//! ```
//!
//! ## Rewriting values
//!
//! [`map_safe`] rewrites parameter values through caller-supplied
//! transformers — decoding opaque ids, coercing types — before
//! compilation, and [`filter`] staples access-control parameters on top.
//! The entry points all accept either a query string or a decoded mapping,
//! so they chain:
//!
//! ```rust
//! use sift::{compile, filter, map_safe, CompileOptions, Entity, MapperSpec, Value};
//!
//! let spec = MapperSpec::new().field("user_id", |v: Value| -> Result<Value, String> {
//!     v.as_str()
//!         .and_then(|s| s.strip_prefix("id_"))
//!         .and_then(|s| s.parse().ok())
//!         .map(Value::Int)
//!         .ok_or_else(|| "Invalid hash".to_string())
//! });
//!
//! let params = filter("user_id[eq]=id_42", [("deleted_at[nil]", "true")]);
//! let params = map_safe(params, &spec).unwrap();
//! let query = compile(params, &Entity::new("Session", "sessions"), &CompileOptions::default());
//! assert!(query.is_ok());
//! ```

pub mod compile;
pub mod constraint;
pub mod decode;
pub mod error;
pub mod join;
pub mod key;
pub mod logging;
pub mod mapper;
pub mod params;
pub mod predicate;
pub mod schema;
pub mod types;
pub mod value;

pub use compile::{compile, CompileOptions, Query, DEFAULT_LIMIT};
pub use constraint::Op;
pub use decode::decode_query_string;
pub use error::{Error, Result};
pub use join::Join;
pub use key::FieldRef;
pub use mapper::{map, map_safe, MapperSpec, Transformed, Transformer};
pub use params::{filter, IntoParams, Params};
pub use predicate::{ColumnExpr, Predicate};
pub use schema::{Association, Entity};
pub use types::{Boundary, OrderBy, SortOrder};
pub use value::Value;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::compile::{compile, CompileOptions, Query};
    pub use crate::decode::decode_query_string;
    pub use crate::error::{Error, Result};
    pub use crate::mapper::{map, map_safe, MapperSpec, Transformed};
    pub use crate::params::{filter, IntoParams, Params};
    pub use crate::schema::{Association, Entity};
    pub use crate::value::Value;
}
