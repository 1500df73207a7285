//! DELETE query builder.

use crate::qb::expr::{Expr, ExprGroup};
use crate::qb::param::ParamList;
use crate::qb::traits::{BuiltQuery, SqlQb};
use tokio_postgres::types::ToSql;

/// DELETE query builder with expression-based WHERE.
///
/// Without any WHERE condition the builder emits `WHERE 1=0`, so a
/// forgotten filter never wipes a table.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    table: String,
    where_group: ExprGroup,
    returning_cols: Vec<String>,
}

impl DeleteQb {
    /// Create a new DELETE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_group: ExprGroup::new(),
            returning_cols: Vec::new(),
        }
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

    /// Set RETURNING columns (string form).
    pub fn returning(mut self, cols: &str) -> Self {
        self.returning_cols = vec![cols.to_string()];
        self
    }

    fn build_delete(&self) -> BuiltQuery {
        let mut params = ParamList::new();

        if self.where_group.is_empty() {
            return BuiltQuery::new(format!("DELETE FROM {} WHERE 1=0", self.table), params);
        }

        let mut sql = format!("DELETE FROM {}", self.table);
        let where_sql = self.where_group.build_into(&mut params);
        sql.push_str(" WHERE ");
        sql.push_str(&where_sql);

        if !self.returning_cols.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning_cols.join(", "));
        }

        BuiltQuery::new(sql, params)
    }
}

impl SqlQb for DeleteQb {
    fn build(&self) -> BuiltQuery {
        self.build_delete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_returning_key() {
        let q = DeleteQb::new("companies")
            .eq("handle", "AAPL")
            .returning("handle")
            .build();
        assert_eq!(
            q.sql,
            "DELETE FROM companies WHERE handle = $1 RETURNING handle"
        );
    }

    #[test]
    fn test_delete_without_where_is_noop() {
        let q = DeleteQb::new("users").returning("username").build();
        assert_eq!(q.sql, "DELETE FROM users WHERE 1=0");
        assert!(q.params.is_empty());
    }
}
