use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiResult;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::state::AppState;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use jobly::{
    Application, ApplicationState, FilterOptions, Job, NewApplication, NewJob, ResourceKind,
    apply_patch,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list).post(create))
        .route("/jobs/{id}", get(detail).patch(update).delete(remove))
        .route("/jobs/{id}/apply", post(apply))
}

#[derive(Serialize)]
struct JobSummary {
    id: i32,
    title: String,
    company_handle: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApplyBody {
    state: ApplicationState,
}

async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    QueryParams(options): QueryParams<FilterOptions>,
) -> ApiResult<Json<Value>> {
    options.validate(ResourceKind::Job)?;
    let db = state.db().await?;
    let jobs: Vec<JobSummary> = Job::list(&db, &options)
        .await?
        .into_iter()
        .map(|j| JobSummary {
            id: j.id(),
            title: j.title,
            company_handle: j.company_handle,
        })
        .collect();
    Ok(Json(json!({ "jobs": jobs })))
}

async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(input): JsonBody<NewJob>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    input.validate()?;
    let db = state.db().await?;
    let job = Job::create(&db, &input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "job": job }))))
}

async fn detail(
    State(state): State<AppState>,
    _user: AuthUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Value>> {
    let db = state.db().await?;
    let job = Job::get(&db, id).await?;
    Ok(Json(json!({ "job": job })))
}

async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathParam(id): PathParam<i32>,
    JsonBody(fields): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let db = state.db().await?;
    let mut job = Job::get(&db, id).await?;
    apply_patch(&mut job, &fields)?;
    job.save(&db).await?;
    Ok(Json(json!({ "job": job })))
}

async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Json<Value>> {
    let db = state.db().await?;
    let message = Job::remove(&db, id).await?;
    Ok(Json(json!({ "message": message })))
}

async fn apply(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<ApplyBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let db = state.db().await?;
    let application = Application::create(
        &db,
        &NewApplication {
            username: user.username().to_string(),
            job_id: id,
            state: body.state,
        },
    )
    .await?;
    tracing::info!(username = %application.username, job_id = id, state = %application.state, "applied");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": application.state })),
    ))
}
