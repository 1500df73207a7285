use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::{JsonBody, PathParam};
use crate::state::AppState;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use jobly::{Application, NewUser, User, apply_patch};
use serde::Serialize;
use serde_json::{Map, Value, json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(register))
        .route(
            "/users/{username}",
            get(detail).patch(update).delete(remove),
        )
}

#[derive(Serialize)]
struct UserDetail {
    #[serde(flatten)]
    user: User,
    applications: Vec<Application>,
}

async fn list(State(state): State<AppState>, _user: AuthUser) -> ApiResult<Json<Value>> {
    let db = state.db().await?;
    let users = User::list(&db).await?;
    Ok(Json(json!({ "users": users })))
}

/// Sign up and log in at once.
async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewUser>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    input.validate()?;
    let db = state.db().await?;
    let user = User::create(&db, &input).await?;
    let token = state.auth.issue(user.username(), user.is_admin)?;
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

async fn detail(
    State(state): State<AppState>,
    _user: AuthUser,
    PathParam(username): PathParam<String>,
) -> ApiResult<Json<Value>> {
    let db = state.db().await?;
    let user = User::get(&db, &username).await?;
    let applications = Application::for_user(&db, &username).await?;
    Ok(Json(json!({ "user": UserDetail { user, applications } })))
}

async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(username): PathParam<String>,
    JsonBody(fields): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    auth.ensure_owner(&username)?;
    let db = state.db().await?;
    let mut user = User::get(&db, &username).await?;
    apply_patch(&mut user, &fields)?;
    user.save(&db).await?;
    Ok(Json(json!({ "user": user })))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(username): PathParam<String>,
) -> ApiResult<Json<Value>> {
    auth.ensure_owner(&username)?;
    let db = state.db().await?;
    let message = User::remove(&db, &username).await?;
    Ok(Json(json!({ "message": message })))
}
