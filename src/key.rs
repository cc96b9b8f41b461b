//! Parameter-key parsing.
//!
//! Filter keys follow a small grammar over word-character identifiers:
//!
//! ```text
//! key       := joinJsonb | join | jsonb | plain | control
//! joinJsonb := ident ':' ident '.' ident '[' ident ']'
//! join      := ident ':' ident '[' ident ']'
//! jsonb     := ident '.' ident '[' ident ']'
//! plain     := ident '[' ident ']'
//! control   := ident | '-' ident
//! ident     := [A-Za-z0-9_]+
//! ```
//!
//! Parsing is purely structural: whether the operator token is a known
//! operator, or the association is joinable, is decided downstream.
//!
//! # Examples
//!
//! ```rust
//! use sift::FieldRef;
//!
//! let parsed = FieldRef::parse("current_version:flow_input.prompt[contains]");
//! assert!(matches!(parsed, FieldRef::JoinJsonb { .. }));
//! assert_eq!(parsed.to_string(), "current_version:flow_input.prompt[contains]");
//!
//! assert!(matches!(FieldRef::parse("sort"), FieldRef::None));
//! ```

use regex::Regex;
use serde::Serialize;
use smol_str::SmolStr;
use std::fmt;
use std::sync::LazyLock;

// Identifiers are ASCII word characters; `\w` would widen the grammar to
// Unicode.
const IDENT: &str = "[A-Za-z0-9_]+";

static JOIN_JSONB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({IDENT}):({IDENT})\.({IDENT})\[({IDENT})\]$"))
        .expect("join-jsonb key pattern")
});
static JOIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({IDENT}):({IDENT})\[({IDENT})\]$")).expect("join key pattern")
});
static JSONB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({IDENT})\.({IDENT})\[({IDENT})\]$")).expect("jsonb key pattern")
});
static PLAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({IDENT})\[({IDENT})\]$")).expect("plain key pattern")
});

/// A parsed parameter key.
///
/// The `op` component is the raw operator token; the constraint compiler
/// resolves it against the closed operator set and reports
/// [`Error::InvalidConstraint`](crate::Error::InvalidConstraint) on a miss,
/// so parsing itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldRef {
    /// Not a filter key: a control parameter (`sort`, `limit`, `start`,
    /// `-start`) or any unrecognized key.
    None,
    /// A direct column on the root entity.
    Plain { field: SmolStr, op: SmolStr },
    /// A key inside a JSON document column on the root entity.
    Jsonb {
        field: SmolStr,
        key: SmolStr,
        op: SmolStr,
    },
    /// A column on an associated entity.
    Join {
        assoc: SmolStr,
        field: SmolStr,
        op: SmolStr,
    },
    /// A JSON key inside a column on an associated entity.
    JoinJsonb {
        assoc: SmolStr,
        field: SmolStr,
        key: SmolStr,
        op: SmolStr,
    },
}

impl FieldRef {
    /// Parse a parameter key.
    ///
    /// The four filter shapes are tried most-specific first; the join-jsonb
    /// pattern must win over jsonb so `a:b.c[eq]` is not misread as a JSON
    /// subscript on a field named `a:b`. Anything that matches no shape is
    /// [`FieldRef::None`].
    pub fn parse(key: &str) -> Self {
        if let Some(caps) = JOIN_JSONB_RE.captures(key) {
            return Self::JoinJsonb {
                assoc: caps[1].into(),
                field: caps[2].into(),
                key: caps[3].into(),
                op: caps[4].into(),
            };
        }
        if let Some(caps) = JOIN_RE.captures(key) {
            return Self::Join {
                assoc: caps[1].into(),
                field: caps[2].into(),
                op: caps[3].into(),
            };
        }
        if let Some(caps) = JSONB_RE.captures(key) {
            return Self::Jsonb {
                field: caps[1].into(),
                key: caps[2].into(),
                op: caps[3].into(),
            };
        }
        if let Some(caps) = PLAIN_RE.captures(key) {
            return Self::Plain {
                field: caps[1].into(),
                op: caps[2].into(),
            };
        }
        Self::None
    }

    /// Check whether this reference filters through an association.
    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Join { .. } | Self::JoinJsonb { .. })
    }

    /// The schema-centric field name a mapper spec resolves against.
    ///
    /// For joined references this is the field on the associated entity,
    /// not the association name, so one transformer entry covers a field
    /// wherever it appears. `None` references have no logical field.
    pub fn logical_field(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Plain { field, .. }
            | Self::Jsonb { field, .. }
            | Self::Join { field, .. }
            | Self::JoinJsonb { field, .. } => Some(field.as_str()),
        }
    }

    /// The raw operator token, if this is a filter reference.
    pub fn op(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Plain { op, .. }
            | Self::Jsonb { op, .. }
            | Self::Join { op, .. }
            | Self::JoinJsonb { op, .. } => Some(op.as_str()),
        }
    }
}

impl fmt::Display for FieldRef {
    /// Print the canonical key for the four filter shapes.
    ///
    /// `FieldRef::None` carries no key material and prints as empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Plain { field, op } => write!(f, "{}[{}]", field, op),
            Self::Jsonb { field, key, op } => write!(f, "{}.{}[{}]", field, key, op),
            Self::Join { assoc, field, op } => write!(f, "{}:{}[{}]", assoc, field, op),
            Self::JoinJsonb {
                assoc,
                field,
                key,
                op,
            } => write!(f, "{}:{}.{}[{}]", assoc, field, key, op),
        }
    }
}
