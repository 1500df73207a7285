use crate::changeset::{ValidationCode, ValidationErrors};
use crate::client::GenericClient;
use crate::error::{StoreError, StoreResult};
use crate::filter::{FilterOptions, ResourceKind, filter_expr};
use crate::patch::{Patch, Patchable, decode_field, unknown_field};
use crate::qb::{self, FieldValues, SqlQb, sql_for_partial_update};
use crate::row::{FromRow, RowExt};
use crate::validate::{is_handle, is_http_url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_postgres::Row;

const TABLE: &str = "companies";

const NOT_FOUND: &str = "Cannot find company by that handle";

/// A company. The handle is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    handle: String,
    pub name: String,
    pub num_employees: Option<i32>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            num_employees: row.try_get_column("num_employees")?,
            description: row.try_get_column("description")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Input for [`Company::create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub num_employees: Option<i32>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !is_handle(&self.handle) {
            errors.add(
                "handle",
                ValidationCode::Regex,
                "handle must be 1-25 letters, digits, '-' or '_'",
            );
        }
        errors.check_text("name", &self.name, 100);
        if self.num_employees.is_some_and(|n| n < 0) {
            errors.add(
                "num_employees",
                ValidationCode::Range,
                "num_employees must not be negative",
            );
        }
        if let Some(url) = &self.logo_url {
            if !is_http_url(url) {
                errors.add("logo_url", ValidationCode::Url, "logo_url must be a URL");
            }
        }
        errors.into_result()
    }
}

/// Typed changes accepted by a company. `handle` is not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub num_employees: Option<Option<i32>>,
    pub description: Option<Option<String>>,
    pub logo_url: Option<Option<String>>,
}

impl Patch for CompanyPatch {
    fn from_fields(fields: &Map<String, Value>) -> StoreResult<Self> {
        let mut patch = CompanyPatch::default();
        for (name, value) in fields {
            match name.as_str() {
                "handle" => return Err(StoreError::immutable("Can't change company handle!")),
                "name" => patch.name = Some(decode_field(name, value)?),
                "num_employees" => {
                    let n: Option<i32> = decode_field(name, value)?;
                    if n.is_some_and(|n| n < 0) {
                        return Err(StoreError::validation("num_employees must not be negative"));
                    }
                    patch.num_employees = Some(n);
                }
                "description" => patch.description = Some(decode_field(name, value)?),
                "logo_url" => {
                    let url: Option<String> = decode_field(name, value)?;
                    if url.as_deref().is_some_and(|u| !is_http_url(u)) {
                        return Err(StoreError::validation("logo_url must be a URL"));
                    }
                    patch.logo_url = Some(url);
                }
                other => return Err(unknown_field(other)),
            }
        }
        Ok(patch)
    }

    fn field_values(&self) -> FieldValues {
        let mut fields = FieldValues::new();
        fields
            .set_opt("name", self.name.clone())
            .set_nullable("num_employees", self.num_employees)
            .set_nullable("description", self.description.clone())
            .set_nullable("logo_url", self.logo_url.clone());
        fields
    }
}

impl Patchable for Company {
    type Patch = CompanyPatch;

    fn apply(&mut self, patch: CompanyPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(n) = patch.num_employees {
            self.num_employees = n;
        }
        if let Some(d) = patch.description {
            self.description = d;
        }
        if let Some(url) = patch.logo_url {
            self.logo_url = url;
        }
    }
}

impl Company {
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            num_employees: None,
            description: None,
            logo_url: None,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Every mutable column with its current value.
    fn mutable_fields(&self) -> FieldValues {
        let mut fields = FieldValues::new();
        fields
            .set("name", self.name.clone())
            .set("num_employees", self.num_employees)
            .set("description", self.description.clone())
            .set("logo_url", self.logo_url.clone());
        fields
    }

    /// Companies matching `options`, ordered by handle.
    pub async fn list(conn: &impl GenericClient, options: &FilterOptions) -> StoreResult<Vec<Self>> {
        let filter = filter_expr(ResourceKind::Company, options)?;
        qb::select(TABLE)
            .and_expr(filter)
            .order_by("handle")
            .fetch_all(conn)
            .await
    }

    pub async fn create(conn: &impl GenericClient, input: &NewCompany) -> StoreResult<Self> {
        input.validate()?;
        qb::insert(TABLE)
            .set("handle", input.handle.clone())
            .set("name", input.name.clone())
            .set("num_employees", input.num_employees)
            .set("description", input.description.clone())
            .set("logo_url", input.logo_url.clone())
            .returning("*")
            .fetch_one(conn)
            .await
    }

    pub async fn get(conn: &impl GenericClient, handle: &str) -> StoreResult<Self> {
        qb::select(TABLE)
            .eq("handle", handle.to_string())
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| StoreError::not_found(NOT_FOUND))
    }

    /// Write every mutable field and reload from the returned row.
    pub async fn save(&mut self, conn: &impl GenericClient) -> StoreResult<()> {
        let q = sql_for_partial_update(TABLE, &self.mutable_fields(), "handle", self.handle.clone());
        let row = conn
            .query_opt(&q.sql, &q.params_ref())
            .await?
            .ok_or_else(|| StoreError::not_found(NOT_FOUND))?;
        *self = Self::from_row(&row)?;
        Ok(())
    }

    /// Apply `patch` directly in the database without loading first.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        patch: &CompanyPatch,
    ) -> StoreResult<Self> {
        qb::update(TABLE)
            .set_fields(&patch.field_values())
            .eq("handle", handle.to_string())
            .returning("*")
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| StoreError::not_found(NOT_FOUND))
    }

    pub async fn delete(self, conn: &impl GenericClient) -> StoreResult<&'static str> {
        Self::remove(conn, &self.handle).await
    }

    pub async fn remove(conn: &impl GenericClient, handle: &str) -> StoreResult<&'static str> {
        qb::delete(TABLE)
            .eq("handle", handle.to_string())
            .returning("handle")
            .query_opt(conn)
            .await?
            .ok_or_else(|| StoreError::not_found(NOT_FOUND))?;
        Ok("Company Deleted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::apply_patch;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn apple() -> Company {
        let mut c = Company::new("AAPL", "apple");
        c.num_employees = Some(123000);
        c
    }

    #[test]
    fn patch_changes_name_and_keeps_handle() {
        let mut company = apple();
        apply_patch(&mut company, &fields(json!({"name": "PEACH"}))).unwrap();
        assert_eq!(company.name, "PEACH");
        assert_eq!(company.handle(), "AAPL");
    }

    #[test]
    fn patch_rejects_handle_change() {
        let mut company = apple();
        let err = apply_patch(&mut company, &fields(json!({"handle": "X"}))).unwrap_err();
        assert!(err.is_immutable());
        assert_eq!(err.to_string(), "Can't change company handle!");
        assert_eq!(company.handle(), "AAPL");
    }

    #[test]
    fn patch_is_all_or_nothing() {
        let mut company = apple();
        let err = apply_patch(
            &mut company,
            &fields(json!({"name": "PEACH", "num_employees": "many"})),
        )
        .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(company.name, "apple");
    }

    #[test]
    fn patch_can_null_optional_columns() {
        let mut company = apple();
        apply_patch(&mut company, &fields(json!({"num_employees": null}))).unwrap();
        assert_eq!(company.num_employees, None);
    }

    #[test]
    fn patch_field_values_feed_partial_update() {
        let patch = CompanyPatch::from_fields(&fields(json!({"num_employees": 100000}))).unwrap();
        let q = sql_for_partial_update(TABLE, &patch.field_values(), "handle", "AAPL".to_string());
        assert_eq!(
            q.sql,
            "UPDATE companies SET num_employees = $1 WHERE handle = $2 RETURNING *"
        );
        assert_eq!(q.params.debug_values(), vec!["Some(100000)", "\"AAPL\""]);
    }

    #[test]
    fn save_writes_every_mutable_field() {
        let company = apple();
        let q = sql_for_partial_update(TABLE, &company.mutable_fields(), "handle", "AAPL");
        assert_eq!(
            q.sql,
            "UPDATE companies SET name = $1, num_employees = $2, description = $3, logo_url = $4 \
             WHERE handle = $5 RETURNING *"
        );
    }

    #[test]
    fn new_company_validation_collects_errors() {
        let input = NewCompany {
            handle: "bad handle".into(),
            name: " ".into(),
            num_employees: Some(-1),
            description: None,
            logo_url: Some("nope".into()),
        };
        let errors = input.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["handle", "name", "num_employees", "logo_url"]);
    }

    #[test]
    fn new_company_rejects_unknown_json_fields() {
        let parsed: Result<NewCompany, _> =
            serde_json::from_value(json!({"handle": "a", "name": "b", "ceo": "c"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn serializes_handle() {
        let v = serde_json::to_value(apple()).unwrap();
        assert_eq!(v["handle"], "AAPL");
        assert_eq!(v["num_employees"], 123000);
    }
}
