use crate::changeset::{ValidationCode, ValidationErrors};
use crate::client::GenericClient;
use crate::error::{StoreError, StoreResult};
use crate::filter::{FilterOptions, ResourceKind, filter_expr};
use crate::patch::{Patch, Patchable, decode_field, unknown_field};
use crate::qb::{self, FieldValues, SqlQb, sql_for_partial_update};
use crate::row::{FromRow, RowExt};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_postgres::Row;

const TABLE: &str = "jobs";

const NOT_FOUND: &str = "Cannot find job by that id";

/// A job posting. The id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    id: i32,
    pub title: String,
    pub salary: f64,
    pub equity: f64,
    pub company_handle: String,
    pub date_posted: NaiveDateTime,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
            date_posted: row.try_get_column("date_posted")?,
        })
    }
}

fn equity_in_range(equity: f64) -> bool {
    (0.0..=1.0).contains(&equity)
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: f64,
    pub equity: f64,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_text("title", &self.title, 200);
        if self.salary < 0.0 {
            errors.add("salary", ValidationCode::Range, "salary must not be negative");
        }
        if !equity_in_range(self.equity) {
            errors.add("equity", ValidationCode::Range, "equity must be between 0 and 1");
        }
        errors.check_text("company_handle", &self.company_handle, 25);
        errors.into_result()
    }
}

/// Typed changes accepted by a job. `id` is not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub title: Option<String>,
    pub salary: Option<f64>,
    pub equity: Option<f64>,
    pub company_handle: Option<String>,
}

impl Patch for JobPatch {
    fn from_fields(fields: &Map<String, Value>) -> StoreResult<Self> {
        let mut patch = JobPatch::default();
        for (name, value) in fields {
            match name.as_str() {
                "id" => return Err(StoreError::immutable("Can't change job id!")),
                "title" => patch.title = Some(decode_field(name, value)?),
                "salary" => {
                    let salary: f64 = decode_field(name, value)?;
                    if salary < 0.0 {
                        return Err(StoreError::validation("salary must not be negative"));
                    }
                    patch.salary = Some(salary);
                }
                "equity" => {
                    let equity: f64 = decode_field(name, value)?;
                    if !equity_in_range(equity) {
                        return Err(StoreError::validation("equity must be between 0 and 1"));
                    }
                    patch.equity = Some(equity);
                }
                "company_handle" => patch.company_handle = Some(decode_field(name, value)?),
                other => return Err(unknown_field(other)),
            }
        }
        Ok(patch)
    }

    fn field_values(&self) -> FieldValues {
        let mut fields = FieldValues::new();
        fields
            .set_opt("title", self.title.clone())
            .set_opt("salary", self.salary)
            .set_opt("equity", self.equity)
            .set_opt("company_handle", self.company_handle.clone());
        fields
    }
}

impl Patchable for Job {
    type Patch = JobPatch;

    fn apply(&mut self, patch: JobPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(salary) = patch.salary {
            self.salary = salary;
        }
        if let Some(equity) = patch.equity {
            self.equity = equity;
        }
        if let Some(handle) = patch.company_handle {
            self.company_handle = handle;
        }
    }
}

impl Job {
    pub fn id(&self) -> i32 {
        self.id
    }

    fn mutable_fields(&self) -> FieldValues {
        let mut fields = FieldValues::new();
        fields
            .set("title", self.title.clone())
            .set("salary", self.salary)
            .set("equity", self.equity)
            .set("company_handle", self.company_handle.clone());
        fields
    }

    /// Jobs matching `options`, ordered by id.
    pub async fn list(conn: &impl GenericClient, options: &FilterOptions) -> StoreResult<Vec<Self>> {
        let filter = filter_expr(ResourceKind::Job, options)?;
        qb::select(TABLE)
            .and_expr(filter)
            .order_by("id")
            .fetch_all(conn)
            .await
    }

    /// Jobs posted by one company, ordered by id.
    pub async fn for_company(conn: &impl GenericClient, handle: &str) -> StoreResult<Vec<Self>> {
        qb::select(TABLE)
            .eq("company_handle", handle.to_string())
            .order_by("id")
            .fetch_all(conn)
            .await
    }

    pub async fn create(conn: &impl GenericClient, input: &NewJob) -> StoreResult<Self> {
        input.validate()?;
        qb::insert(TABLE)
            .set("title", input.title.clone())
            .set("salary", input.salary)
            .set("equity", input.equity)
            .set("company_handle", input.company_handle.clone())
            .returning("*")
            .fetch_one(conn)
            .await
    }

    pub async fn get(conn: &impl GenericClient, id: i32) -> StoreResult<Self> {
        qb::select(TABLE)
            .eq("id", id)
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| StoreError::not_found(NOT_FOUND))
    }

    /// Write every mutable field and reload from the returned row.
    pub async fn save(&mut self, conn: &impl GenericClient) -> StoreResult<()> {
        let q = sql_for_partial_update(TABLE, &self.mutable_fields(), "id", self.id);
        let row = conn
            .query_opt(&q.sql, &q.params_ref())
            .await?
            .ok_or_else(|| StoreError::not_found(NOT_FOUND))?;
        *self = Self::from_row(&row)?;
        Ok(())
    }

    /// Apply `patch` directly in the database without loading first.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: &JobPatch) -> StoreResult<Self> {
        qb::update(TABLE)
            .set_fields(&patch.field_values())
            .eq("id", id)
            .returning("*")
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| StoreError::not_found(NOT_FOUND))
    }

    pub async fn delete(self, conn: &impl GenericClient) -> StoreResult<&'static str> {
        Self::remove(conn, self.id).await
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> StoreResult<&'static str> {
        qb::delete(TABLE)
            .eq("id", id)
            .returning("id")
            .query_opt(conn)
            .await?
            .ok_or_else(|| StoreError::not_found(NOT_FOUND))?;
        Ok("Job Deleted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::apply_patch;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn engineer() -> Job {
        Job {
            id: 7,
            title: "Engineer".into(),
            salary: 100000.0,
            equity: 0.1,
            company_handle: "AAPL".into(),
            date_posted: NaiveDate::from_ymd_opt(2019, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
        }
    }

    #[test]
    fn patch_rejects_id_change() {
        let mut job = engineer();
        let err = apply_patch(&mut job, &fields(json!({"id": 8, "title": "x"}))).unwrap_err();
        assert_eq!(err.to_string(), "Can't change job id!");
        assert_eq!(job.id(), 7);
        assert_eq!(job.title, "Engineer");
    }

    #[test]
    fn patch_checks_equity_range() {
        let mut job = engineer();
        let err = apply_patch(&mut job, &fields(json!({"equity": 1.5}))).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(job.equity, 0.1);

        apply_patch(&mut job, &fields(json!({"equity": 1}))).unwrap();
        assert_eq!(job.equity, 1.0);
    }

    #[test]
    fn patch_updates_salary_and_title() {
        let mut job = engineer();
        apply_patch(
            &mut job,
            &fields(json!({"title": "WINDOW WASHER", "salary": 50})),
        )
        .unwrap();
        assert_eq!(job.title, "WINDOW WASHER");
        assert_eq!(job.salary, 50.0);
    }

    #[test]
    fn null_is_not_a_salary() {
        let mut job = engineer();
        assert!(apply_patch(&mut job, &fields(json!({"salary": null}))).is_err());
    }

    #[test]
    fn update_statement_is_keyed_by_id() {
        let job = engineer();
        let q = sql_for_partial_update(TABLE, &job.mutable_fields(), "id", job.id());
        assert_eq!(
            q.sql,
            "UPDATE jobs SET title = $1, salary = $2, equity = $3, company_handle = $4 \
             WHERE id = $5 RETURNING *"
        );
        assert_eq!(q.params.debug_values()[4], "7");
    }

    #[test]
    fn new_job_validation() {
        let input = NewJob {
            title: "".into(),
            salary: -1.0,
            equity: 2.0,
            company_handle: "AAPL".into(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
