use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::state::AppState;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use jobly::User;
use serde::Deserialize;
use serde_json::{Value, json};

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> ApiResult<Json<Value>> {
    let db = state.db().await?;
    let user = User::authenticate(&db, &credentials.username, &credentials.password).await?;
    let token = state.auth.issue(user.username(), user.is_admin)?;
    tracing::info!(username = user.username(), "logged in");
    Ok(Json(json!({ "token": token })))
}
