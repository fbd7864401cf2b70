//! SQL translation: compiles a [`ClauseSet`] into SQL text plus an aligned
//! bindings sequence.
//!
//! Compilation is deterministic and read-only over the clause set. Every
//! emitted `$n` placeholder corresponds 1:1, by position, to an entry in the
//! bindings list. `IS`/`IS NOT` render a literal `NULL` and bind nothing;
//! `LIMIT` renders its (typed) integer literally and stays outside the
//! bindings.

use crate::clause::{ClauseSet, Operator, WhereClause, WhereValue};
use crate::error::{QueryError, QueryResult};
use crate::param::ParamList;

/// The output of translation: SQL with positional placeholders and the
/// bindings they stand for.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub sql: String,
    pub bindings: ParamList,
}

/// Compile an accumulated clause set into a SELECT statement.
///
/// Fails with [`QueryError::MalformedClause`] when a clause's operator/value
/// shape is invalid rather than emitting broken SQL.
pub fn compile(clauses: &ClauseSet) -> QueryResult<CompiledQuery> {
    if clauses.tables().is_empty() {
        return Err(QueryError::malformed(
            "statement has no target table; call table() before compiling",
        ));
    }

    let mut bindings = ParamList::new();

    let tables = clauses
        .tables()
        .iter()
        .map(|t| t.render())
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("SELECT * FROM {}", tables);

    for (i, clause) in clauses.wheres().iter().enumerate() {
        if i == 0 {
            sql.push_str(" WHERE ");
        } else {
            sql.push(' ');
            sql.push_str(clause.joiner.as_sql());
            sql.push(' ');
        }
        sql.push_str(&render_where(clause, &mut bindings)?);
    }

    if let Some(limit) = clauses.limit() {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    tracing::debug!(sql = %sql, bindings = bindings.len(), "compiled statement");

    Ok(CompiledQuery { sql, bindings })
}

/// Render one where-clause, appending its bound values in emission order.
fn render_where(clause: &WhereClause, bindings: &mut ParamList) -> QueryResult<String> {
    let column = &clause.column;
    let op = clause.operator.as_sql();

    match (&clause.operator, &clause.value) {
        (Operator::Is, WhereValue::Null) | (Operator::IsNot, WhereValue::Null) => {
            // NULL is rendered literally; no placeholder, no binding.
            Ok(format!("{} {} NULL", column, op))
        }
        (Operator::Is, _) | (Operator::IsNot, _) => Err(QueryError::malformed(format!(
            "{} requires a null value on column '{}'",
            op, column
        ))),
        (Operator::In, WhereValue::List(values))
        | (Operator::NotIn, WhereValue::List(values)) => {
            if values.is_empty() {
                return Err(QueryError::malformed(format!(
                    "{} requires a non-empty value list on column '{}'",
                    op, column
                )));
            }
            let placeholders: Vec<String> = values
                .iter()
                .map(|v| {
                    let idx = bindings.push_param(v.clone());
                    format!("${}", idx)
                })
                .collect();
            Ok(format!("{} {} ({})", column, op, placeholders.join(", ")))
        }
        (Operator::In, _) | (Operator::NotIn, _) => Err(QueryError::malformed(format!(
            "{} requires a value list on column '{}'",
            op, column
        ))),
        (Operator::Between, WhereValue::Pair(from, to)) => {
            let idx_from = bindings.push_param(from.clone());
            let idx_to = bindings.push_param(to.clone());
            Ok(format!(
                "{} BETWEEN ${} AND ${}",
                column, idx_from, idx_to
            ))
        }
        (Operator::Between, _) => Err(QueryError::malformed(format!(
            "BETWEEN requires exactly two bounds on column '{}'",
            column
        ))),
        (Operator::Eq, value) | (Operator::Other(_), value) => match value {
            WhereValue::Scalar(param) => {
                let idx = bindings.push_param(param.clone());
                Ok(format!("{} {} ${}", column, op, idx))
            }
            // Raw right-hand sides are spliced verbatim and never bound.
            WhereValue::Raw(raw) => Ok(format!("{} {} {}", column, op, raw.as_str())),
            _ => Err(QueryError::malformed(format!(
                "operator '{}' requires a scalar value on column '{}'",
                op, column
            ))),
        },
    }
}

/// Count the `$n` positional placeholders in a SQL string.
///
/// The translator emits placeholders sequentially, so the count equals the
/// highest index present.
pub fn count_placeholders(sql: &str) -> usize {
    let mut max_idx = 0usize;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' {
            let mut num_str = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_digit() {
                    num_str.push(chars.next().unwrap());
                } else {
                    break;
                }
            }
            if let Ok(idx) = num_str.parse::<usize>() {
                max_idx = max_idx.max(idx);
            }
        }
    }

    max_idx
}
