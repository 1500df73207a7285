//! Shared application state.

use crate::auth::AuthKeys;
use crate::error::ApiError;
use jobly::{PgConn, PgPool, StoreError, TracedClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth: Arc<AuthKeys>,
}

impl AppState {
    pub fn new(pool: PgPool, auth: AuthKeys) -> Self {
        Self {
            pool,
            auth: Arc::new(auth),
        }
    }

    /// Check out a pooled connection with statement logging.
    pub async fn db(&self) -> Result<TracedClient<PgConn>, ApiError> {
        let conn = self.pool.get().await.map_err(StoreError::from)?;
        Ok(TracedClient::new(conn))
    }
}
