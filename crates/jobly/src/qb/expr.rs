//! Expression layer for WHERE conditions.
//!
//! `Expr::build()` writes SQL with correct `$n` placeholders; indices are
//! allocated from the shared [`ParamList`] at build time, never patched in
//! afterwards by string replacement.

use crate::qb::param::{Param, ParamList};
use tokio_postgres::types::ToSql;

/// Expression node for building WHERE clauses.
#[derive(Clone, Debug)]
pub enum Expr {
    /// AND group: all conditions must be true.
    And(Vec<Expr>),

    /// OR group: at least one condition must be true.
    Or(Vec<Expr>),

    /// Simple comparison: column op $n
    Compare {
        column: String,
        op: &'static str,
        value: Param,
    },

    /// Case-insensitive match of several columns against one bound pattern:
    /// `(a ILIKE $n OR b ILIKE $n)`.
    AnyIlike { columns: Vec<String>, pattern: Param },

    /// NULL check: column IS NULL or column IS NOT NULL
    NullCheck { column: String, is_null: bool },
}

impl Expr {
    /// Create an AND expression from a list of expressions.
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    /// Create an OR expression from a list of expressions.
    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    fn compare<T: ToSql + Send + Sync + 'static>(
        column: impl Into<String>,
        op: &'static str,
        value: T,
    ) -> Self {
        Expr::Compare {
            column: column.into(),
            op,
            value: Param::new(value),
        }
    }

    /// column = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(column: impl Into<String>, value: T) -> Self {
        Self::compare(column, "=", value)
    }

    /// column > value
    pub fn gt<T: ToSql + Send + Sync + 'static>(column: impl Into<String>, value: T) -> Self {
        Self::compare(column, ">", value)
    }

    /// column >= value
    pub fn gte<T: ToSql + Send + Sync + 'static>(column: impl Into<String>, value: T) -> Self {
        Self::compare(column, ">=", value)
    }

    /// column < value
    pub fn lt<T: ToSql + Send + Sync + 'static>(column: impl Into<String>, value: T) -> Self {
        Self::compare(column, "<", value)
    }

    /// column <= value
    pub fn lte<T: ToSql + Send + Sync + 'static>(column: impl Into<String>, value: T) -> Self {
        Self::compare(column, "<=", value)
    }

    /// column ILIKE pattern (case-insensitive)
    pub fn ilike<T: ToSql + Send + Sync + 'static>(column: impl Into<String>, pattern: T) -> Self {
        Self::compare(column, "ILIKE", pattern)
    }

    /// (col1 ILIKE $n OR col2 ILIKE $n ...), binding the pattern once.
    pub fn any_ilike<T: ToSql + Send + Sync + 'static>(columns: &[&str], pattern: T) -> Self {
        Expr::AnyIlike {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            pattern: Param::new(pattern),
        }
    }

    /// column IS NULL
    pub fn is_null(column: impl Into<String>) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null: true,
        }
    }

    /// Check if this expression is empty (contains no conditions).
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().all(|e| e.is_empty()),
            Expr::AnyIlike { columns, .. } => columns.is_empty(),
            _ => false,
        }
    }

    /// Build the SQL fragment, pushing bound values onto `params`.
    pub fn build(&self, params: &mut ParamList) -> String {
        match self {
            Expr::And(exprs) => Self::join(exprs, " AND ", params, |e| matches!(e, Expr::Or(_))),
            Expr::Or(exprs) => Self::join(exprs, " OR ", params, |e| matches!(e, Expr::And(_))),
            Expr::Compare { column, op, value } => {
                let idx = params.push_param(value.clone());
                format!("{} {} ${}", column, op, idx)
            }
            Expr::AnyIlike { columns, pattern } => {
                if columns.is_empty() {
                    return String::new();
                }
                let idx = params.push_param(pattern.clone());
                let parts: Vec<String> = columns
                    .iter()
                    .map(|col| format!("{} ILIKE ${}", col, idx))
                    .collect();
                if parts.len() == 1 {
                    parts.into_iter().collect()
                } else {
                    format!("({})", parts.join(" OR "))
                }
            }
            Expr::NullCheck { column, is_null } => {
                if *is_null {
                    format!("{} IS NULL", column)
                } else {
                    format!("{} IS NOT NULL", column)
                }
            }
        }
    }

    fn join(
        exprs: &[Expr],
        sep: &str,
        params: &mut ParamList,
        needs_parens: impl Fn(&Expr) -> bool,
    ) -> String {
        exprs
            .iter()
            .filter(|e| !e.is_empty())
            .map(|e| {
                let sql = e.build(params);
                if needs_parens(e) && !sql.is_empty() {
                    format!("({})", sql)
                } else {
                    sql
                }
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(sep)
    }
}

/// Conditions ANDed together, built incrementally by the query builders.
#[derive(Clone, Debug, Default)]
pub struct ExprGroup {
    exprs: Vec<Expr>,
}

impl ExprGroup {
    /// Create a new empty expression group.
    pub fn new() -> Self {
        Self { exprs: Vec::new() }
    }

    /// Check if the group is empty.
    pub fn is_empty(&self) -> bool {
        self.exprs.iter().all(|e| e.is_empty())
    }

    /// Add an expression to be ANDed.
    pub fn and_expr(&mut self, expr: Expr) {
        self.exprs.push(expr);
    }

    /// Add a condition: column = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(&mut self, column: &str, value: T) {
        self.exprs.push(Expr::eq(column, value));
    }

    /// Add a condition: column >= value
    pub fn gte<T: ToSql + Send + Sync + 'static>(&mut self, column: &str, value: T) {
        self.exprs.push(Expr::gte(column, value));
    }

    /// Add a condition: column <= value
    pub fn lte<T: ToSql + Send + Sync + 'static>(&mut self, column: &str, value: T) {
        self.exprs.push(Expr::lte(column, value));
    }

    /// Add multiple columns with OR ILIKE sharing one pattern.
    pub fn any_ilike<T: ToSql + Send + Sync + 'static>(&mut self, columns: &[&str], pattern: T) {
        if columns.is_empty() {
            return;
        }
        self.exprs.push(Expr::any_ilike(columns, pattern));
    }

    /// Build into an existing parameter list, continuing its numbering.
    pub fn build_into(&self, params: &mut ParamList) -> String {
        Expr::join(&self.exprs, " AND ", params, |e| matches!(e, Expr::Or(_)))
    }

    /// Build with a fresh parameter list starting at `$1`.
    pub fn build(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        let sql = self.build_into(&mut params);
        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_ilike_binds_pattern_once() {
        let mut params = ParamList::new();
        let sql = Expr::any_ilike(&["name", "handle"], "%app%".to_string()).build(&mut params);
        assert_eq!(sql, "(name ILIKE $1 OR handle ILIKE $1)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn single_column_any_ilike_has_no_parens() {
        let mut params = ParamList::new();
        let sql = Expr::any_ilike(&["title"], "%%".to_string()).build(&mut params);
        assert_eq!(sql, "title ILIKE $1");
    }

    #[test]
    fn group_continues_numbering() {
        let mut params = ParamList::new();
        params.push(1i32);

        let mut group = ExprGroup::new();
        group.gte("salary", 10.0f64);
        group.lte("salary", 20.0f64);
        let sql = group.build_into(&mut params);

        assert_eq!(sql, "salary >= $2 AND salary <= $3");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn nested_or_inside_and_is_parenthesized() {
        let expr = Expr::and(vec![
            Expr::eq("a", 1i32),
            Expr::or(vec![Expr::eq("b", 2i32), Expr::is_null("c")]),
        ]);
        let mut params = ParamList::new();
        assert_eq!(expr.build(&mut params), "a = $1 AND (b = $2 OR c IS NULL)");
    }

    #[test]
    fn empty_group_builds_empty_sql() {
        let (sql, params) = ExprGroup::new().build();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }
}
