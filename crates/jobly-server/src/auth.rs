//! JWT tokens and the extractors that enforce login, admin and ownership.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing and verification keys derived from one secret.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthKeys")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl AuthKeys {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for `username`, valid from now for the configured TTL.
    pub fn issue(&self, username: &str, is_admin: bool) -> Result<String, ApiError> {
        let iat = chrono::Utc::now().timestamp();
        self.sign(&Claims {
            username: username.to_string(),
            is_admin,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("failed to sign token: {e}")))
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected token");
                ApiError::unauthorized("Unauthorized")
            })
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    #[serde(rename = "_token")]
    token: Option<String>,
}

/// `Authorization: Bearer <token>` first, then the `_token` query parameter.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|token| !token.is_empty())
}

/// Any logged-in user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }

    /// Only the account's own user may proceed.
    pub fn ensure_owner(&self, username: &str) -> Result<(), ApiError> {
        if self.0.username == username {
            Ok(())
        } else {
            Err(ApiError::forbidden("You can only change your own account"))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;
        let claims = state.auth.verify(&token)?;
        Ok(AuthUser(claims))
    }
}

/// A logged-in user whose token carries `is_admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin {
            tracing::debug!(username = %claims.username, "admin route refused");
            return Err(ApiError::forbidden("Admin access required"));
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, bearer: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn issued_token_verifies() {
        let keys = AuthKeys::new("secret", 3600);
        let token = keys.issue("joe", true).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.username, "joe");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = AuthKeys::new("secret", 3600).issue("joe", false).unwrap();
        let err = AuthKeys::new("other", 3600).verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let keys = AuthKeys::new("secret", 3600);
        let admin = keys.issue("joe", true).unwrap();
        let plain = keys.issue("joe", false).unwrap();
        // admin payload with the non-admin signature
        let mut forged: Vec<&str> = admin.split('.').collect();
        let sig = plain.split('.').nth(2).unwrap();
        forged[2] = sig;
        assert!(keys.verify(&forged.join(".")).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = AuthKeys::new("secret", 3600);
        let now = chrono::Utc::now().timestamp();
        let token = keys
            .sign(&Claims {
                username: "joe".into(),
                is_admin: false,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn token_read_from_header_then_query() {
        assert_eq!(token_from_parts(&parts("/jobs", Some("abc"))).as_deref(), Some("abc"));
        assert_eq!(
            token_from_parts(&parts("/jobs?_token=xyz&search=a", None)).as_deref(),
            Some("xyz")
        );
        assert_eq!(
            token_from_parts(&parts("/jobs?_token=xyz", Some("abc"))).as_deref(),
            Some("abc")
        );
        assert_eq!(token_from_parts(&parts("/jobs?search=a", None)), None);
        assert_eq!(token_from_parts(&parts("/jobs", None)), None);
    }

    #[test]
    fn owner_check() {
        let user = AuthUser(Claims {
            username: "joe".into(),
            is_admin: false,
            iat: 0,
            exp: 0,
        });
        assert!(user.ensure_owner("joe").is_ok());
        assert!(matches!(user.ensure_owner("ann"), Err(ApiError::Forbidden(_))));
    }
}
