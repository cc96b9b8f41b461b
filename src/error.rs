//! Error types for query compilation.
//!
//! Errors are returned as values; nothing in the compiler throws across the
//! API boundary. The one documented exception is [`map`](crate::mapper::map),
//! the re-raising variant of the value mapper.

use thiserror::Error;

/// Result type for compilation and mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling parameters into a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The operator in a filter key is unknown for the field shape.
    ///
    /// Carries the original parameter key so the caller can report the
    /// offending input verbatim.
    #[error("Invalid constraint: {key}")]
    InvalidConstraint { key: String },

    /// A joined filter key names an association outside the whitelist.
    #[error("Join not allowed: {assoc}")]
    JoinNotAllowed { assoc: String },

    /// A mapper callback reported failure during `map_safe`.
    #[error("transformation failed: {reason}")]
    TransformationFailed { reason: String },

    /// The `limit` parameter was not a base-10 integer.
    #[error("invalid limit: {value}")]
    InvalidLimit { value: String },

    /// Both `start` and `-start` were supplied.
    #[error("conflicting boundaries: start={start}, -start={before}")]
    ConflictingBoundaries { start: String, before: String },
}

impl Error {
    /// Create an invalid-constraint error for a parameter key.
    pub fn invalid_constraint(key: impl Into<String>) -> Self {
        Self::InvalidConstraint { key: key.into() }
    }

    /// Create a join-not-allowed error for an association name.
    pub fn join_not_allowed(assoc: impl Into<String>) -> Self {
        Self::JoinNotAllowed {
            assoc: assoc.into(),
        }
    }

    /// Create a transformation-failed error with the reported reason.
    pub fn transformation_failed(reason: impl Into<String>) -> Self {
        Self::TransformationFailed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_constraint_message() {
        let err = Error::invalid_constraint("name[like]");
        assert_eq!(err.to_string(), "Invalid constraint: name[like]");
    }

    #[test]
    fn test_join_not_allowed_message() {
        let err = Error::join_not_allowed("owner");
        assert_eq!(err.to_string(), "Join not allowed: owner");
    }

    #[test]
    fn test_transformation_failed_message() {
        let err = Error::transformation_failed("Invalid hash");
        assert!(err.to_string().contains("Invalid hash"));
    }
}
