//! Error types for prefixql

use thiserror::Error;

/// Result type alias for prefixql operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for statement building and dispatch
#[derive(Debug, Error)]
pub enum QueryError {
    /// A clause's operator/value shape is invalid (e.g. `IN` with an empty
    /// list). Raised when the accumulated statement is compiled.
    #[error("Malformed clause: {0}")]
    MalformedClause(String),

    /// The execution adapter was asked to dispatch a fetch method the
    /// backend does not expose.
    #[error("Unsupported fetch method: {0}")]
    UnsupportedMethod(String),

    /// The compiled SQL's placeholder count does not match the supplied
    /// bindings. The translator makes this structurally impossible, but the
    /// adapter still validates before dispatch.
    #[error("Placeholder/binding mismatch: {placeholders} placeholders, {bindings} bindings")]
    PrepareFailure { placeholders: usize, bindings: usize },

    /// Driver-level error from the database layer
    #[error("Database error: {0}")]
    Db(#[from] tokio_postgres::Error),

    /// Pool error.
    ///
    /// This crate never constructs it itself (executors receive an already
    /// checked-out client); it exists so callers acquiring a client from a
    /// `deadpool_postgres::Pool` can use `?` in functions returning
    /// [`QueryResult`].
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl QueryError {
    /// Create a malformed-clause error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedClause(message.into())
    }

    /// Check if this is a malformed-clause error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedClause(_))
    }

    /// Check if this is an unsupported-method error
    pub fn is_unsupported_method(&self) -> bool {
        matches!(self, Self::UnsupportedMethod(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for QueryError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(all(test, feature = "pool"))]
mod tests {
    use super::*;

    #[test]
    fn pool_acquisition_errors_convert_via_question_mark() {
        fn checkout() -> QueryResult<()> {
            Err(deadpool_postgres::PoolError::Closed)?
        }

        assert!(matches!(checkout().unwrap_err(), QueryError::Pool(_)));
    }
}
