//! HTTP API for the jobly job board.
//!
//! Routes live in [`routes`]; [`routes::router`] builds the whole app from an
//! [`AppState`]. `main` wires configuration, logging and the pool.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use auth::{AdminUser, AuthKeys, AuthUser, Claims};
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
