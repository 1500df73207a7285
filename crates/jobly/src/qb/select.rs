//! SELECT query builder.

use crate::qb::expr::{Expr, ExprGroup};
use crate::qb::param::ParamList;
use crate::qb::traits::{BuiltQuery, SqlQb};
use tokio_postgres::types::ToSql;

/// SELECT query builder with expression-based WHERE.
#[derive(Clone, Debug)]
pub struct SelectQb {
    /// Table or FROM expression
    from_expr: String,
    /// SELECT columns (default ["*"])
    select_cols: Vec<String>,
    /// WHERE conditions
    where_group: ExprGroup,
    /// ORDER BY clauses
    order_clauses: Vec<String>,
}

impl SelectQb {
    /// Create a new SELECT query builder for a table.
    pub fn new(table: &str) -> Self {
        Self {
            from_expr: table.to_string(),
            select_cols: vec!["*".to_string()],
            where_group: ExprGroup::new(),
            order_clauses: Vec::new(),
        }
    }

    /// Set SELECT columns (string form, supports complex expressions).
    pub fn select(mut self, cols: &str) -> Self {
        self.select_cols = vec![cols.to_string()];
        self
    }

    /// Set SELECT columns (array form).
    pub fn select_cols(mut self, cols: &[&str]) -> Self {
        self.select_cols = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add WHERE: column = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(mut self, column: &str, value: T) -> Self {
        self.where_group.eq(column, value);
        self
    }

    /// Add a custom expression.
    pub fn and_expr(mut self, expr: Expr) -> Self {
        self.where_group.and_expr(expr);
        self
    }

    /// Replace the WHERE conditions with a prepared group.
    pub fn where_group(mut self, group: ExprGroup) -> Self {
        self.where_group = group;
        self
    }

    /// Add ORDER BY clause.
    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_clauses.push(clause.to_string());
        self
    }

    fn build_select(&self) -> BuiltQuery {
        let mut params = ParamList::new();
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_cols.join(", "),
            self.from_expr
        );

        let where_sql = self.where_group.build_into(&mut params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clauses.join(", "));
        }

        BuiltQuery::new(sql, params)
    }
}

impl SqlQb for SelectQb {
    fn build(&self) -> BuiltQuery {
        self.build_select()
    }
}
