//! # prefixql
//!
//! A fluent, table-prefix-aware SQL statement builder for multi-tenant
//! shared-schema deployments (the WordPress `wp_` convention).
//!
//! ## Features
//!
//! - **Chainable accumulation**: `table()`, `where_*`, `limit()` collect
//!   clause fragments into a structured representation
//! - **Deterministic translation**: the clause set compiles to SQL with `$n`
//!   positional placeholders plus an aligned bindings sequence
//! - **Table prefixing**: every table identifier is rewritten through a
//!   [`TablePrefix`] fixed at construction; [`Raw`] fragments are exempt
//! - **Injected execution**: terminal operations run through an [`Executor`]
//!   (a direct client, a transaction, or a pooled client), never through
//!   ambient globals
//! - **Fail-fast compilation**: malformed clause shapes and unknown fetch
//!   methods surface as errors, never as silent empty results
//!
//! ## Example
//!
//! ```ignore
//! use prefixql::QueryBuilder;
//!
//! let post = QueryBuilder::new(&client, "wp_")
//!     .table("posts")
//!     .where_eq("id", 1i64)
//!     .first()
//!     .await?;
//!
//! let drafts = QueryBuilder::new(&client, "wp_")
//!     .table("posts")
//!     .where_in("status", vec!["draft", "pending"])
//!     .where_null("deleted_at")
//!     .get()
//!     .await?;
//! ```
//!
//! Builders are single-use, mutable, unshared state: one builder per
//! in-flight statement. The only blocking point is the executor's call into
//! the database layer.

pub mod builder;
pub mod clause;
pub mod error;
pub mod executor;
pub mod param;
pub mod prefix;
pub mod raw;
pub mod translate;

pub use builder::QueryBuilder;
pub use clause::{ClauseSet, Joiner, Operator, WhereClause, WhereValue};
pub use error::{QueryError, QueryResult};
pub use executor::{Executor, GET_RESULTS, GET_ROW, dispatch};
pub use param::{Param, ParamList};
pub use prefix::{PrefixMode, TablePrefix, TableRef};
pub use raw::{Raw, raw};
pub use translate::{CompiledQuery, compile, count_placeholders};
