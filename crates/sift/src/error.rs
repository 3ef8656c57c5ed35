//! Compilation error types.

use thiserror::Error;

/// Errors raised while compiling a resource descriptor into a query.
///
/// All of these are detected eagerly, before the query builder is
/// mutated; none are retried internally.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query under construction has no resolvable primary alias.
    /// Fatal: no other stage can run without it.
    #[error("query has no resolvable root alias")]
    NoRootAlias,

    /// A filter is structurally invalid (bad key, missing value, ...).
    #[error("invalid filter: {0}")]
    InvalidFilterShape(String),

    /// A sort rule has no resolvable key.
    #[error("invalid sort: {0}")]
    InvalidSortShape(String),

    /// An include entry is not a valid relation path.
    #[error("invalid include: {0}")]
    InvalidIncludesShape(String),

    /// Unknown filter operator symbol.
    #[error("unknown filter operator '{0}'")]
    InvalidOperator(String),

    /// A relation path references a relation the schema cannot describe.
    #[error("cannot resolve relation '{relation}' on '{owner}'")]
    UnresolvableRelation { owner: String, relation: String },

    /// Two distinct relation paths would join under the same alias.
    #[error("relation paths '{first}' and '{second}' both join as '{alias}'")]
    AmbiguousRelationAlias {
        alias: String,
        first: String,
        second: String,
    },

    /// A registered custom handler failed for a field.
    #[error("custom handler for '{field}' failed")]
    Handler {
        field: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result type alias using QueryError.
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_problem() {
        let err = QueryError::InvalidOperator("zz".to_string());
        assert_eq!(err.to_string(), "unknown filter operator 'zz'");

        let err = QueryError::UnresolvableRelation {
            owner: "users".to_string(),
            relation: "cmpany".to_string(),
        };
        assert!(err.to_string().contains("cmpany"));
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn handler_error_keeps_source() {
        use std::error::Error as _;

        let err = QueryError::Handler {
            field: "company.name".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        assert!(err.to_string().contains("company.name"));
        assert!(err.source().is_some());
    }
}
