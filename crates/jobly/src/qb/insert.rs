//! INSERT query builder.

use crate::qb::param::{Param, ParamList};
use crate::qb::traits::{BuiltQuery, SqlQb};
use tokio_postgres::types::ToSql;

/// INSERT query builder with unified parameter handling.
#[derive(Clone, Debug)]
pub struct InsertQb {
    /// Table name
    table: String,
    /// Column names paired with their bound values
    values: Vec<(String, Param)>,
    /// RETURNING columns
    returning_cols: Vec<String>,
}

impl InsertQb {
    /// Create a new INSERT query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            values: Vec::new(),
            returning_cols: Vec::new(),
        }
    }

    /// Set a column value.
    pub fn set<T: ToSql + Send + Sync + 'static>(mut self, column: &str, value: T) -> Self {
        self.values.push((column.to_string(), Param::new(value)));
        self
    }

    /// Set an optional column value (None => skip, column default applies).
    pub fn set_opt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Set RETURNING columns (string form).
    pub fn returning(mut self, cols: &str) -> Self {
        self.returning_cols = vec![cols.to_string()];
        self
    }

    fn build_insert(&self) -> BuiltQuery {
        let mut params = ParamList::new();
        let mut columns = Vec::with_capacity(self.values.len());
        let mut placeholders = Vec::with_capacity(self.values.len());

        for (col, value) in &self.values {
            let idx = params.push_param(value.clone());
            columns.push(col.as_str());
            placeholders.push(format!("${}", idx));
        }

        let mut sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", self.table)
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table,
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        if !self.returning_cols.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning_cols.join(", "));
        }

        BuiltQuery::new(sql, params)
    }
}

impl SqlQb for InsertQb {
    fn build(&self) -> BuiltQuery {
        self.build_insert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_returning() {
        let q = InsertQb::new("jobs")
            .set("title", "Engineer")
            .set("salary", 120000.0f64)
            .set("company_handle", "AAPL")
            .returning("*")
            .build();
        assert_eq!(
            q.sql,
            "INSERT INTO jobs (title, salary, company_handle) VALUES ($1, $2, $3) RETURNING *"
        );
        assert_eq!(q.params.len(), 3);
    }

    #[test]
    fn test_set_opt_skips_none() {
        let sql = InsertQb::new("users")
            .set("username", "alice")
            .set_opt::<String>("photo_url", None)
            .to_sql();
        assert_eq!(sql, "INSERT INTO users (username) VALUES ($1)");
    }

    #[test]
    fn test_no_columns_uses_defaults() {
        assert_eq!(
            InsertQb::new("t").to_sql(),
            "INSERT INTO t DEFAULT VALUES"
        );
    }
}
