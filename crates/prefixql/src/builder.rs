//! Chainable statement builder.
//!
//! [`QueryBuilder`] accumulates clauses through consuming chain calls, then
//! compiles and dispatches them through its injected [`Executor`]. One
//! builder per in-flight statement; the type is not meant to be shared
//! across threads.
//!
//! # Example
//! ```ignore
//! use prefixql::QueryBuilder;
//!
//! let post = QueryBuilder::new(&client, "wp_")
//!     .table("posts")
//!     .where_eq("id", 1i64)
//!     .first()
//!     .await?;
//! ```

use crate::clause::{ClauseSet, Joiner, Operator, WhereClause, WhereValue};
use crate::error::QueryResult;
use crate::executor::{self, Executor, GET_RESULTS, GET_ROW};
use crate::param::Param;
use crate::prefix::{PrefixMode, TablePrefix, TableRef};
use crate::raw::Raw;
use crate::translate::{self, CompiledQuery};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Fluent builder over an injected executor and a fixed table prefix.
#[derive(Debug)]
pub struct QueryBuilder<'e, E> {
    executor: &'e E,
    prefix: TablePrefix,
    clauses: ClauseSet,
}

impl<'e, E: Executor> QueryBuilder<'e, E> {
    /// Create a builder bound to an executor, with the given table prefix.
    pub fn new(executor: &'e E, prefix: impl Into<TablePrefix>) -> Self {
        Self {
            executor,
            prefix: prefix.into(),
            clauses: ClauseSet::new(),
        }
    }

    // ==================== Tables ====================

    /// Add a target table. The prefix is applied unconditionally.
    pub fn table(self, table: impl Into<TableRef>) -> Self {
        self.add_tables(vec![table.into()])
    }

    /// Add several target tables at once, preserving order.
    pub fn tables(self, tables: &[&str]) -> Self {
        self.add_tables(tables.iter().map(|t| TableRef::from(*t)).collect())
    }

    /// Add an aliased table; renders `table AS alias` with the prefix on
    /// the table side only.
    pub fn table_as(self, table: impl Into<String>, alias: impl Into<String>) -> Self {
        self.add_tables(vec![TableRef::Aliased {
            table: table.into(),
            alias: alias.into(),
        }])
    }

    /// Add a verbatim FROM fragment, exempt from prefixing.
    pub fn table_raw(self, fragment: Raw) -> Self {
        self.add_tables(vec![TableRef::Raw(fragment)])
    }

    fn add_tables(mut self, tables: Vec<TableRef>) -> Self {
        let resolved = self.prefix.resolve_all(tables, PrefixMode::TablesOnly);
        self.clauses.add_tables(resolved);
        self
    }

    // ==================== Where predicates ====================

    /// Add WHERE: column = value
    pub fn where_eq<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.add_where(column, Operator::Eq, WhereValue::Scalar(Param::new(value)), Joiner::And)
    }

    /// Add WHERE with a caller-supplied operator: column op value
    pub fn where_op<T: ToSql + Send + Sync + 'static>(
        self,
        column: &str,
        operator: &str,
        value: T,
    ) -> Self {
        self.add_where(
            column,
            Operator::from(operator),
            WhereValue::Scalar(Param::new(value)),
            Joiner::And,
        )
    }

    /// Add OR WHERE: column = value
    pub fn or_where_eq<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.add_where(column, Operator::Eq, WhereValue::Scalar(Param::new(value)), Joiner::Or)
    }

    /// Add OR WHERE with a caller-supplied operator.
    pub fn or_where_op<T: ToSql + Send + Sync + 'static>(
        self,
        column: &str,
        operator: &str,
        value: T,
    ) -> Self {
        self.add_where(
            column,
            Operator::from(operator),
            WhereValue::Scalar(Param::new(value)),
            Joiner::Or,
        )
    }

    /// Add AND NOT WHERE: column = value
    pub fn where_not_eq<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.add_where(
            column,
            Operator::Eq,
            WhereValue::Scalar(Param::new(value)),
            Joiner::AndNot,
        )
    }

    /// Add AND NOT WHERE with a caller-supplied operator.
    pub fn where_not_op<T: ToSql + Send + Sync + 'static>(
        self,
        column: &str,
        operator: &str,
        value: T,
    ) -> Self {
        self.add_where(
            column,
            Operator::from(operator),
            WhereValue::Scalar(Param::new(value)),
            Joiner::AndNot,
        )
    }

    /// Add OR NOT WHERE: column = value
    pub fn or_where_not_eq<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.add_where(
            column,
            Operator::Eq,
            WhereValue::Scalar(Param::new(value)),
            Joiner::OrNot,
        )
    }

    /// Add OR NOT WHERE with a caller-supplied operator.
    pub fn or_where_not_op<T: ToSql + Send + Sync + 'static>(
        self,
        column: &str,
        operator: &str,
        value: T,
    ) -> Self {
        self.add_where(
            column,
            Operator::from(operator),
            WhereValue::Scalar(Param::new(value)),
            Joiner::OrNot,
        )
    }

    /// Add WHERE: column IN (values...). The list must be non-empty by
    /// compile time.
    pub fn where_in<T: ToSql + Send + Sync + 'static>(self, column: &str, values: Vec<T>) -> Self {
        self.add_where(column, Operator::In, list_value(values), Joiner::And)
    }

    /// Add WHERE: column NOT IN (values...)
    pub fn where_not_in<T: ToSql + Send + Sync + 'static>(
        self,
        column: &str,
        values: Vec<T>,
    ) -> Self {
        self.add_where(column, Operator::NotIn, list_value(values), Joiner::And)
    }

    /// Add OR WHERE: column IN (values...)
    pub fn or_where_in<T: ToSql + Send + Sync + 'static>(
        self,
        column: &str,
        values: Vec<T>,
    ) -> Self {
        self.add_where(column, Operator::In, list_value(values), Joiner::Or)
    }

    /// Add OR WHERE: column NOT IN (values...)
    pub fn or_where_not_in<T: ToSql + Send + Sync + 'static>(
        self,
        column: &str,
        values: Vec<T>,
    ) -> Self {
        self.add_where(column, Operator::NotIn, list_value(values), Joiner::Or)
    }

    /// Add WHERE: column BETWEEN from AND to
    pub fn where_between<T: ToSql + Send + Sync + 'static>(
        self,
        column: &str,
        from: T,
        to: T,
    ) -> Self {
        self.add_where(
            column,
            Operator::Between,
            WhereValue::Pair(Param::new(from), Param::new(to)),
            Joiner::And,
        )
    }

    /// Add OR WHERE: column BETWEEN from AND to
    pub fn or_where_between<T: ToSql + Send + Sync + 'static>(
        self,
        column: &str,
        from: T,
        to: T,
    ) -> Self {
        self.add_where(
            column,
            Operator::Between,
            WhereValue::Pair(Param::new(from), Param::new(to)),
            Joiner::Or,
        )
    }

    /// Add WHERE: column IS NULL
    pub fn where_null(self, column: &str) -> Self {
        self.add_where(column, Operator::Is, WhereValue::Null, Joiner::And)
    }

    /// Add WHERE: column IS NOT NULL
    pub fn where_not_null(self, column: &str) -> Self {
        self.add_where(column, Operator::IsNot, WhereValue::Null, Joiner::And)
    }

    /// Add OR WHERE: column IS NULL
    pub fn or_where_null(self, column: &str) -> Self {
        self.add_where(column, Operator::Is, WhereValue::Null, Joiner::Or)
    }

    /// Add OR WHERE: column IS NOT NULL
    pub fn or_where_not_null(self, column: &str) -> Self {
        self.add_where(column, Operator::IsNot, WhereValue::Null, Joiner::Or)
    }

    /// Add WHERE with a verbatim right-hand side, spliced into the SQL and
    /// never bound as a parameter.
    pub fn where_raw(self, column: &str, operator: &str, fragment: Raw) -> Self {
        self.add_where(
            column,
            Operator::from(operator),
            WhereValue::Raw(fragment),
            Joiner::And,
        )
    }

    /// Add OR WHERE with a verbatim right-hand side.
    pub fn or_where_raw(self, column: &str, operator: &str, fragment: Raw) -> Self {
        self.add_where(
            column,
            Operator::from(operator),
            WhereValue::Raw(fragment),
            Joiner::Or,
        )
    }

    /// Add AND NOT WHERE with a verbatim right-hand side.
    pub fn where_not_raw(self, column: &str, operator: &str, fragment: Raw) -> Self {
        self.add_where(
            column,
            Operator::from(operator),
            WhereValue::Raw(fragment),
            Joiner::AndNot,
        )
    }

    /// Add OR NOT WHERE with a verbatim right-hand side.
    pub fn or_where_not_raw(self, column: &str, operator: &str, fragment: Raw) -> Self {
        self.add_where(
            column,
            Operator::from(operator),
            WhereValue::Raw(fragment),
            Joiner::OrNot,
        )
    }

    /// Every where variant funnels through here; clauses append in call
    /// order and are never de-duplicated.
    fn add_where(
        mut self,
        column: &str,
        operator: Operator,
        value: WhereValue,
        joiner: Joiner,
    ) -> Self {
        self.clauses.push_where(WhereClause {
            column: column.to_string(),
            operator,
            value,
            joiner,
        });
        self
    }

    // ==================== Limit ====================

    /// Set the row limit. Repeated calls overwrite; the value is rendered
    /// as a literal integer and is not validated for sign.
    pub fn limit(mut self, limit: i64) -> Self {
        self.clauses.set_limit(limit);
        self
    }

    // ==================== Compilation ====================

    /// Compile the accumulated statement without executing it.
    pub fn compile(&self) -> QueryResult<CompiledQuery> {
        translate::compile(&self.clauses)
    }

    /// Get the compiled SQL string (for debugging and tests).
    ///
    /// Compilation is fallible here (a malformed clause set is an error,
    /// not broken SQL), so this surfaces the same errors as
    /// [`QueryBuilder::compile`].
    pub fn to_sql(&self) -> QueryResult<String> {
        Ok(translate::compile(&self.clauses)?.sql)
    }

    // ==================== Terminal operations ====================

    /// Compile and run the statement, returning every matching row.
    ///
    /// An empty vec means the query ran and matched nothing; build and
    /// dispatch failures surface as errors.
    pub async fn get(self) -> QueryResult<Vec<Row>> {
        let compiled = translate::compile(&self.clauses)?;
        executor::dispatch(self.executor, GET_RESULTS, &compiled).await
    }

    /// Fetch the first matching row, if any.
    ///
    /// Sets `LIMIT 1`, silently overwriting any limit set earlier in the
    /// chain.
    pub async fn first(self) -> QueryResult<Option<Row>> {
        let builder = self.limit(1);
        let compiled = translate::compile(&builder.clauses)?;
        let rows = executor::dispatch(builder.executor, GET_ROW, &compiled).await?;
        Ok(rows.into_iter().next())
    }
}

fn list_value<T: ToSql + Send + Sync + 'static>(values: Vec<T>) -> WhereValue {
    WhereValue::List(values.into_iter().map(Param::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::RecordingExecutor;
    use crate::raw::raw;

    fn builder(executor: &RecordingExecutor) -> QueryBuilder<'_, RecordingExecutor> {
        QueryBuilder::new(executor, "wp_")
    }

    #[test]
    fn table_is_prefixed() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor).table("posts");
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM wp_posts");
    }

    #[test]
    fn tables_merge_across_calls() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor).table("posts").table_as("users", "u");
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM wp_posts, wp_users AS u");
    }

    #[test]
    fn raw_table_is_not_prefixed() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor).table_raw(raw("information_schema.tables"));
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM information_schema.tables");
    }

    #[test]
    fn where_eq_uses_equality_operator() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor).table("posts").where_eq("id", 1i64);
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM wp_posts WHERE id = $1");
    }

    #[test]
    fn where_op_accepts_caller_operators() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor)
            .table("posts")
            .where_op("score", ">", 10i32)
            .where_op("title", "LIKE", "%rust%");
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM wp_posts WHERE score > $1 AND title LIKE $2"
        );
    }

    #[test]
    fn joiner_variants_render_in_call_order() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor)
            .table("posts")
            .where_eq("a", 1i32)
            .or_where_eq("b", 2i32)
            .where_not_eq("c", 3i32)
            .or_where_not_eq("d", 4i32);
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM wp_posts WHERE a = $1 OR b = $2 AND NOT c = $3 OR NOT d = $4"
        );
    }

    #[test]
    fn repeated_identical_wheres_are_kept() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor)
            .table("posts")
            .where_eq("id", 1i32)
            .where_eq("id", 1i32);
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM wp_posts WHERE id = $1 AND id = $2"
        );
    }

    #[test]
    fn where_in_variants() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor)
            .table("posts")
            .where_in("id", vec![1i64, 2, 3])
            .or_where_not_in("status", vec!["trash", "spam"]);
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM wp_posts WHERE id IN ($1, $2, $3) OR status NOT IN ($4, $5)"
        );
    }

    #[test]
    fn empty_where_in_fails_at_compile() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor).table("posts").where_in::<i64>("id", vec![]);
        assert!(qb.compile().unwrap_err().is_malformed());
    }

    #[test]
    fn where_between_binds_bounds_in_order() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor)
            .table("posts")
            .where_between("id", 10i64, 20i64);
        let compiled = qb.compile().unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM wp_posts WHERE id BETWEEN $1 AND $2"
        );
        assert_eq!(compiled.bindings.len(), 2);
    }

    #[test]
    fn null_variants_bind_nothing() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor)
            .table("posts")
            .where_null("deleted_at")
            .or_where_not_null("published_at");
        let compiled = qb.compile().unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM wp_posts WHERE deleted_at IS NULL OR published_at IS NOT NULL"
        );
        assert!(compiled.bindings.is_empty());
    }

    #[test]
    fn where_raw_is_spliced_verbatim() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor)
            .table("posts")
            .where_raw("created_at", "<", raw("NOW()"));
        let compiled = qb.compile().unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM wp_posts WHERE created_at < NOW()"
        );
        assert!(compiled.bindings.is_empty());
    }

    #[test]
    fn raw_values_flow_through_every_joiner() {
        let executor = RecordingExecutor::new();
        let compiled = builder(&executor)
            .table("posts")
            .where_raw("created_at", "<", raw("NOW()"))
            .or_where_raw("updated_at", ">=", raw("NOW() - INTERVAL '1 day'"))
            .where_not_raw("expires_at", "=", raw("NOW()"))
            .or_where_not_raw("deleted_at", "<", raw("NOW()"))
            .compile()
            .unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM wp_posts WHERE created_at < NOW() \
             OR updated_at >= NOW() - INTERVAL '1 day' \
             AND NOT expires_at = NOW() OR NOT deleted_at < NOW()"
        );
        assert!(compiled.bindings.is_empty());
    }

    #[test]
    fn to_sql_surfaces_malformed_statements_as_errors() {
        let executor = RecordingExecutor::new();
        // No table() call, so compilation must fail rather than panic.
        let err = builder(&executor).where_eq("id", 1i64).to_sql().unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn limit_last_write_wins() {
        let executor = RecordingExecutor::new();
        let qb = builder(&executor).table("posts").limit(50).limit(10);
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM wp_posts LIMIT 10");
    }

    #[tokio::test]
    async fn get_dispatches_compiled_statement() {
        let executor = RecordingExecutor::new();
        let rows = builder(&executor)
            .table("posts")
            .where_eq("id", 1i64)
            .get()
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(
            executor.last_sql().as_deref(),
            Some("SELECT * FROM wp_posts WHERE id = $1")
        );
        assert_eq!(executor.last_param_count(), Some(1));
    }

    #[tokio::test]
    async fn first_overwrites_explicit_limit() {
        let executor = RecordingExecutor::new();
        let row = builder(&executor)
            .table("posts")
            .where_eq("id", 1i64)
            .limit(50)
            .first()
            .await
            .unwrap();
        assert!(row.is_none());
        assert_eq!(
            executor.last_sql().as_deref(),
            Some("SELECT * FROM wp_posts WHERE id = $1 LIMIT 1")
        );
    }

    #[tokio::test]
    async fn terminal_errors_are_distinct_from_empty_results() {
        let executor = RecordingExecutor::new();
        let err = builder(&executor).where_eq("id", 1i64).get().await.unwrap_err();
        assert!(err.is_malformed());
        assert!(executor.calls.lock().unwrap().is_empty());
    }
}
