//! Intermediate representation for accumulated statements.
//!
//! The builder front-end collects clause fragments into a [`ClauseSet`];
//! the translator compiles that set into SQL plus bindings. The set is
//! mutated additively by chain calls (except `limit`, which overwrites)
//! and read exactly once at compile time.

use crate::param::Param;
use crate::prefix::TableRef;
use crate::raw::Raw;

/// The keyword connecting a where-clause to the clauses preceding it.
/// Ignored for the first clause in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner {
    And,
    Or,
    AndNot,
    OrNot,
}

impl Joiner {
    /// The SQL keyword for this joiner.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Joiner::And => "AND",
            Joiner::Or => "OR",
            Joiner::AndNot => "AND NOT",
            Joiner::OrNot => "OR NOT",
        }
    }
}

/// A where-clause operator.
///
/// `Other` carries caller-supplied operators (`>`, `<=`, `LIKE`, ...) which
/// always render with a single placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq,
    In,
    NotIn,
    Between,
    Is,
    IsNot,
    Other(String),
}

impl Operator {
    /// The SQL text of this operator.
    pub fn as_sql(&self) -> &str {
        match self {
            Operator::Eq => "=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between => "BETWEEN",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::Other(op) => op,
        }
    }
}

impl From<&str> for Operator {
    fn from(op: &str) -> Self {
        match op {
            "=" => Operator::Eq,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "BETWEEN" => Operator::Between,
            "IS" => Operator::Is,
            "IS NOT" => Operator::IsNot,
            other => Operator::Other(other.to_string()),
        }
    }
}

/// The right-hand side of a where-clause, shaped per operator.
///
/// Scalar for `=` and caller-supplied operators, Pair for `BETWEEN`, List
/// for `IN`/`NOT IN`, Null for `IS`/`IS NOT`, Raw for verbatim fragments
/// that must never be bound.
#[derive(Debug, Clone)]
pub enum WhereValue {
    Scalar(Param),
    Pair(Param, Param),
    List(Vec<Param>),
    Raw(Raw),
    Null,
}

/// One filter predicate awaiting compilation. Order within the clause set
/// is significant; identical clauses are never de-duplicated.
#[derive(Debug, Clone)]
pub struct WhereClause {
    pub column: String,
    pub operator: Operator,
    pub value: WhereValue,
    pub joiner: Joiner,
}

/// The accumulated statement: target tables, filter predicates, row limit.
#[derive(Debug, Clone, Default)]
pub struct ClauseSet {
    tables: Vec<TableRef>,
    wheres: Vec<WhereClause>,
    limit: Option<i64>,
}

impl ClauseSet {
    /// Create an empty clause set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge table references into the `tables` clause, appending to any
    /// already present.
    pub fn add_tables(&mut self, tables: impl IntoIterator<Item = TableRef>) {
        self.tables.extend(tables);
    }

    /// Append one where-clause record.
    pub fn push_where(&mut self, clause: WhereClause) {
        self.wheres.push(clause);
    }

    /// Set the row limit. Last write wins; repeated calls overwrite.
    pub fn set_limit(&mut self, limit: i64) {
        self.limit = Some(limit);
    }

    /// The resolved table references, in call order.
    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    /// The where-clause records, in call order.
    pub fn wheres(&self) -> &[WhereClause] {
        &self.wheres
    }

    /// The row limit, if set.
    pub fn limit(&self) -> Option<i64> {
        self.limit
    }
}
