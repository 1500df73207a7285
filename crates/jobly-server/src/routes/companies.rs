use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiResult;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::state::AppState;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use jobly::{Company, FilterOptions, Job, NewCompany, ResourceKind, apply_patch};
use serde::Serialize;
use serde_json::{Map, Value, json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list).post(create))
        .route(
            "/companies/{handle}",
            get(detail).patch(update).delete(remove),
        )
}

#[derive(Serialize)]
struct CompanySummary {
    handle: String,
    name: String,
}

#[derive(Serialize)]
struct CompanyDetail {
    #[serde(flatten)]
    company: Company,
    jobs: Vec<Job>,
}

async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    QueryParams(options): QueryParams<FilterOptions>,
) -> ApiResult<Json<Value>> {
    options.validate(ResourceKind::Company)?;
    let db = state.db().await?;
    let companies: Vec<CompanySummary> = Company::list(&db, &options)
        .await?
        .into_iter()
        .map(|c| CompanySummary {
            handle: c.handle().to_string(),
            name: c.name,
        })
        .collect();
    Ok(Json(json!({ "companies": companies })))
}

async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(input): JsonBody<NewCompany>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    input.validate()?;
    let db = state.db().await?;
    let company = Company::create(&db, &input).await?;
    tracing::info!(handle = company.handle(), by = %admin.username, "company created");
    Ok((StatusCode::CREATED, Json(json!({ "company": company }))))
}

async fn detail(
    State(state): State<AppState>,
    _user: AuthUser,
    PathParam(handle): PathParam<String>,
) -> ApiResult<Json<Value>> {
    let db = state.db().await?;
    let company = Company::get(&db, &handle).await?;
    let jobs = Job::for_company(&db, &handle).await?;
    Ok(Json(json!({ "company": CompanyDetail { company, jobs } })))
}

async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathParam(handle): PathParam<String>,
    JsonBody(fields): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let db = state.db().await?;
    let mut company = Company::get(&db, &handle).await?;
    apply_patch(&mut company, &fields)?;
    company.save(&db).await?;
    Ok(Json(json!({ "company": company })))
}

async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathParam(handle): PathParam<String>,
) -> ApiResult<Json<Value>> {
    let db = state.db().await?;
    let message = Company::get(&db, &handle).await?.delete(&db).await?;
    Ok(Json(json!({ "message": message })))
}
