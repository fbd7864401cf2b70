//! Execution adapter: the boundary between compiled statements and the
//! database layer.
//!
//! The [`Executor`] trait unifies direct connections, transactions, and
//! pooled clients, so terminal builder operations can run against any of
//! them. All implementations go through the driver's prepared-statement
//! path; bound values are never interpolated into SQL text.

use crate::error::{QueryError, QueryResult};
use crate::translate::{CompiledQuery, count_placeholders};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Fetch method returning every matching row.
pub const GET_RESULTS: &str = "get_results";

/// Fetch method returning at most the first matching row.
pub const GET_ROW: &str = "get_row";

/// A database backend able to run a parameterized query and return rows.
///
/// Implemented for `tokio_postgres::Client`, `tokio_postgres::Transaction`,
/// and (with the `pool` feature) `deadpool_postgres::Client`, so the same
/// builder code composes with or without an outer transaction.
pub trait Executor: Send + Sync {
    /// Prepare `sql`, bind `params` positionally, and return all rows.
    fn fetch_rows(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = QueryResult<Vec<Row>>> + Send;
}

impl Executor for tokio_postgres::Client {
    async fn fetch_rows(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> QueryResult<Vec<Row>> {
        let stmt = self.prepare(sql).await?;
        Ok(self.query(&stmt, params).await?)
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    async fn fetch_rows(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> QueryResult<Vec<Row>> {
        let stmt = self.prepare(sql).await?;
        Ok(self.query(&stmt, params).await?)
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Client {
    async fn fetch_rows(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> QueryResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        Executor::fetch_rows(&***self, sql, params).await
    }
}

/// Dispatch a named fetch method against an executor.
///
/// Validates the placeholder/binding alignment before touching the backend;
/// a mismatch is a [`QueryError::PrepareFailure`]. An unrecognized method
/// name is a hard [`QueryError::UnsupportedMethod`] error, never a silent
/// null result.
pub async fn dispatch<E: Executor>(
    executor: &E,
    method: &str,
    query: &CompiledQuery,
) -> QueryResult<Vec<Row>> {
    let placeholders = count_placeholders(&query.sql);
    if placeholders != query.bindings.len() {
        return Err(QueryError::PrepareFailure {
            placeholders,
            bindings: query.bindings.len(),
        });
    }

    match method {
        GET_RESULTS | GET_ROW => {
            tracing::debug!(method, sql = %query.sql, bindings = query.bindings.len(), "dispatching statement");
            let params = query.bindings.as_refs();
            executor.fetch_rows(&query.sql, &params).await
        }
        other => Err(QueryError::UnsupportedMethod(other.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records dispatched SQL and returns no rows.
    pub(crate) struct RecordingExecutor {
        pub calls: Mutex<Vec<(String, usize)>>,
    }

    impl RecordingExecutor {
        pub fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn last_sql(&self) -> Option<String> {
            self.calls.lock().unwrap().last().map(|(sql, _)| sql.clone())
        }

        pub fn last_param_count(&self) -> Option<usize> {
            self.calls.lock().unwrap().last().map(|(_, n)| *n)
        }
    }

    impl Executor for RecordingExecutor {
        async fn fetch_rows(
            &self,
            sql: &str,
            params: &[&(dyn ToSql + Sync)],
        ) -> QueryResult<Vec<Row>> {
            self.calls
                .lock()
                .unwrap()
                .push((sql.to_string(), params.len()));
            Ok(Vec::new())
        }
    }
}
