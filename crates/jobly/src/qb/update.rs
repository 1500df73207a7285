//! Partial UPDATE builder.
//!
//! Turns an ordered field/value mapping into
//! `UPDATE <table> SET a = $1, b = $2 WHERE <key> = $3 RETURNING *`.
//! Absent values are skipped and do not consume a placeholder.

use crate::error::{StoreError, StoreResult};
use crate::qb::expr::{Expr, ExprGroup};
use crate::qb::param::{Param, ParamList};
use crate::qb::traits::{BuiltQuery, SqlQb};
use tokio_postgres::types::ToSql;

/// Ordered field-value mapping.
///
/// Each entry is either present (`Some`, written to SQL, possibly as an
/// explicit NULL) or absent (`None`, never written). Field names are unique:
/// setting a name twice replaces the value in its original position.
#[derive(Clone, Debug, Default)]
pub struct FieldValues {
    entries: Vec<(String, Option<Param>)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace an entry.
    pub fn set_param(&mut self, name: &str, value: Option<Param>) -> &mut Self {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name.to_string(), value)),
        }
        self
    }

    /// Set a present value.
    pub fn set<T: ToSql + Send + Sync + 'static>(&mut self, name: &str, value: T) -> &mut Self {
        self.set_param(name, Some(Param::new(value)))
    }

    /// Set a value that may be absent (`None` => skipped at build time).
    pub fn set_opt<T: ToSql + Send + Sync + 'static>(
        &mut self,
        name: &str,
        value: Option<T>,
    ) -> &mut Self {
        self.set_param(name, value.map(Param::new))
    }

    /// Set a nullable column: outer `None` is absent, `Some(None)` writes NULL.
    pub fn set_nullable<T: ToSql + Send + Sync + 'static>(
        &mut self,
        name: &str,
        value: Option<Option<T>>,
    ) -> &mut Self {
        self.set_param(name, value.map(Param::new))
    }

    /// Number of entries, present or absent.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that will be written.
    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_some()).count()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Param>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_ref()))
    }

    /// Names of the present entries, in order.
    pub fn present_names(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, v)| v.is_some())
            .map(|(n, _)| n)
            .collect()
    }
}

/// UPDATE query builder.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    table: String,
    fields: FieldValues,
    where_group: ExprGroup,
    returning_cols: Vec<String>,
}

impl UpdateQb {
    /// Create a new UPDATE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            fields: FieldValues::new(),
            where_group: ExprGroup::new(),
            returning_cols: Vec::new(),
        }
    }

    /// Set a column value.
    pub fn set<T: ToSql + Send + Sync + 'static>(mut self, column: &str, value: T) -> Self {
        self.fields.set(column, value);
        self
    }

    /// Set an optional column value (None => skip).
    pub fn set_opt<T: ToSql + Send + Sync + 'static>(
        mut self,
        column: &str,
        value: Option<T>,
    ) -> Self {
        self.fields.set_opt(column, value);
        self
    }

    /// Merge a whole field-value mapping, keeping its order.
    pub fn set_fields(mut self, fields: &FieldValues) -> Self {
        for (name, value) in fields.iter() {
            self.fields.set_param(name, value.cloned());
        }
        self
    }

    /// Add WHERE: column = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(mut self, column: &str, value: T) -> Self {
        self.where_group.eq(column, value);
        self
    }

    /// Add a custom WHERE expression.
    pub fn and_expr(mut self, expr: Expr) -> Self {
        self.where_group.and_expr(expr);
        self
    }

    /// Set RETURNING columns (string form).
    pub fn returning(mut self, cols: &str) -> Self {
        self.returning_cols = vec![cols.to_string()];
        self
    }

    fn build_update(&self) -> BuiltQuery {
        let mut params = ParamList::new();

        let mut set_parts = Vec::new();
        for (col, value) in self.fields.iter() {
            if let Some(param) = value {
                let idx = params.push_param(param.clone());
                set_parts.push(format!("{} = ${}", col, idx));
            }
        }

        // An empty SET list is emitted as-is; `validate` stops it from executing.
        let mut sql = format!("UPDATE {} SET {}", self.table, set_parts.join(", "));

        let where_sql = self.where_group.build_into(&mut params);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.returning_cols.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning_cols.join(", "));
        }

        BuiltQuery::new(sql, params)
    }
}

impl SqlQb for UpdateQb {
    fn build(&self) -> BuiltQuery {
        self.build_update()
    }

    fn validate(&self) -> StoreResult<()> {
        if self.fields.present_count() == 0 {
            return Err(StoreError::validation(format!(
                "no fields to update on {}",
                self.table
            )));
        }
        Ok(())
    }
}

/// Build a parameterized partial UPDATE for the row whose `key_column`
/// equals `key_value`, returning the updated row.
///
/// Present fields become `field = $n` in mapping order; `key_value` is bound
/// last. The builder never checks for an empty SET list: callers must pass
/// at least one present field or accept an unexecutable statement.
///
/// ```ignore
/// let mut fields = FieldValues::new();
/// fields.set("num_employees", 100000i32);
/// let q = sql_for_partial_update("companies", &fields, "handle", "AAPL".to_string());
/// assert_eq!(q.sql, "UPDATE companies SET num_employees = $1 WHERE handle = $2 RETURNING *");
/// ```
pub fn sql_for_partial_update<K: ToSql + Send + Sync + 'static>(
    table: &str,
    fields: &FieldValues,
    key_column: &str,
    key_value: K,
) -> BuiltQuery {
    UpdateQb::new(table)
        .set_fields(fields)
        .eq(key_column, key_value)
        .returning("*")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_update() {
        let qb = UpdateQb::new("users")
            .set("first_name", "Josephina")
            .eq("username", "joerocket");
        assert_eq!(
            qb.to_sql(),
            "UPDATE users SET first_name = $1 WHERE username = $2"
        );
    }

    #[test]
    fn test_partial_update_single_field() {
        let mut fields = FieldValues::new();
        fields.set("num_employees", 100000i32);

        let q = sql_for_partial_update("companies", &fields, "handle", "AAPL".to_string());

        assert_eq!(
            q.sql,
            "UPDATE companies SET num_employees = $1 WHERE handle = $2 RETURNING *"
        );
        assert_eq!(q.params.debug_values(), vec!["100000", "\"AAPL\""]);
    }

    #[test]
    fn test_absent_values_are_skipped() {
        let mut fields = FieldValues::new();
        fields
            .set_opt("title", Some("WINDOW WASHER".to_string()))
            .set_opt::<f64>("salary", None)
            .set_opt("equity", Some(0.5f64));

        let q = sql_for_partial_update("jobs", &fields, "id", 7i32);

        assert_eq!(
            q.sql,
            "UPDATE jobs SET title = $1, equity = $2 WHERE id = $3 RETURNING *"
        );
        assert_eq!(q.params.len(), 3);
        assert_eq!(q.params.debug_values()[2], "7");
    }

    #[test]
    fn test_explicit_null_is_written() {
        let mut fields = FieldValues::new();
        fields
            .set_nullable::<String>("description", Some(None))
            .set_nullable::<String>("logo_url", None);

        let q = sql_for_partial_update("companies", &fields, "handle", "GOOG".to_string());

        assert_eq!(
            q.sql,
            "UPDATE companies SET description = $1 WHERE handle = $2 RETURNING *"
        );
        assert_eq!(q.params.debug_values()[0], "None");
    }

    #[test]
    fn test_placeholders_follow_mapping_order() {
        let mut fields = FieldValues::new();
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            fields.set(name, i as i32);
        }
        let q = sql_for_partial_update("t", &fields, "k", 99i32);
        assert_eq!(
            q.sql,
            "UPDATE t SET a = $1, b = $2, c = $3, d = $4 WHERE k = $5 RETURNING *"
        );
        assert_eq!(q.params.debug_values(), vec!["0", "1", "2", "3", "99"]);
    }

    #[test]
    fn test_resetting_a_name_keeps_position() {
        let mut fields = FieldValues::new();
        fields.set("name", "apple").set("description", "x").set("name", "PEACH");

        assert_eq!(fields.len(), 2);
        let q = sql_for_partial_update("companies", &fields, "handle", "AAPL");
        assert_eq!(
            q.sql,
            "UPDATE companies SET name = $1, description = $2 WHERE handle = $3 RETURNING *"
        );
        assert_eq!(q.params.debug_values()[0], "\"PEACH\"");
    }

    #[test]
    fn test_empty_set_is_not_special_cased() {
        let mut fields = FieldValues::new();
        fields.set_opt::<String>("name", None);

        let q = sql_for_partial_update("companies", &fields, "handle", "AAPL");
        assert_eq!(q.sql, "UPDATE companies SET  WHERE handle = $1 RETURNING *");
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn test_empty_set_fails_validation_before_execution() {
        let qb = UpdateQb::new("companies").eq("handle", "AAPL");
        let err = qb.validate().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_build_is_deterministic() {
        let mut fields = FieldValues::new();
        fields.set("title", "CEO").set("salary", 1.0f64);

        let a = sql_for_partial_update("jobs", &fields, "id", 1i32);
        let b = sql_for_partial_update("jobs", &fields, "id", 1i32);

        assert_eq!(a.sql, b.sql);
        assert_eq!(a.params.debug_values(), b.params.debug_values());
    }
}
