//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobly::{StoreError, ValidationErrors};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

static HIDE_INTERNAL: AtomicBool = AtomicBool::new(false);

/// Replace 500 messages with a generic one. Set once at startup.
pub fn hide_internal_details(hide: bool) {
    HIDE_INTERNAL.store(hide, Ordering::Relaxed);
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Invalid(errors) => ApiError::Invalid(errors),
            StoreError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            StoreError::UniqueViolation(_) => ApiError::Conflict(err.to_string()),
            StoreError::Validation(_)
            | StoreError::Immutable(_)
            | StoreError::ForeignKeyViolation(_)
            | StoreError::CheckViolation(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Invalid(errors)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a ValidationErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                if HIDE_INTERNAL.load(Ordering::Relaxed) {
                    "An internal error occurred".to_string()
                } else {
                    msg.clone()
                }
            }
            ApiError::Invalid(_) => "Invalid input".to_string(),
            other => other.to_string(),
        };
        let details = match &self {
            ApiError::Invalid(errors) => Some(errors),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                status: status.as_u16(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobly::ValidationCode;
    use serde_json::Value;

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::not_found("Cannot find company by that handle"), StatusCode::NOT_FOUND),
            (StoreError::validation("Min cannot be greater than max"), StatusCode::BAD_REQUEST),
            (StoreError::immutable("Can't change job id!"), StatusCode::BAD_REQUEST),
            (StoreError::UniqueViolation("users_pkey".into()), StatusCode::CONFLICT),
            (StoreError::ForeignKeyViolation("jobs_fkey".into()), StatusCode::BAD_REQUEST),
            (StoreError::CheckViolation("equity".into()), StatusCode::BAD_REQUEST),
            (StoreError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (StoreError::Other("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[tokio::test]
    async fn body_carries_status_and_message() {
        let (status, body) =
            body_json(StoreError::immutable("Can't change company handle!").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["status"], 400);
        assert_eq!(body["error"]["message"], "Can't change company handle!");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn validation_errors_are_listed() {
        let mut errors = ValidationErrors::new();
        errors.add("email", ValidationCode::Email, "email must be a valid email");
        let (status, body) = body_json(errors.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["field"], "email");
        assert_eq!(body["error"]["details"][0]["code"], "email");
    }
}
