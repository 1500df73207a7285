//! # jobly
//!
//! Data layer for the jobly job board: companies, jobs, users and
//! applications stored in Postgres.
//!
//! ## Features
//!
//! - **Parameterized SQL only**: every statement is built by the `qb`
//!   builders with `$n` placeholders allocated at build time
//! - **Partial updates**: [`sql_for_partial_update`] turns an ordered
//!   field/value mapping into `UPDATE ... SET ... RETURNING *`
//! - **Typed patches**: [`apply_patch`] maps client field names onto
//!   per-record setters; identity fields cannot be patched
//! - **Listing filters**: [`build_filter_predicate`] for substring search
//!   plus numeric bounds
//! - **Transaction-friendly**: pass a transaction anywhere a
//!   [`GenericClient`] is expected
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{Company, FilterOptions, apply_patch};
//!
//! let pool = jobly::create_pool(&database_url)?;
//! let conn = pool.get().await?;
//!
//! let big = Company::list(&conn, &FilterOptions { min: Some(1000), ..Default::default() }).await?;
//!
//! let mut apple = Company::get(&conn, "AAPL").await?;
//! apply_patch(&mut apple, &fields)?;
//! apple.save(&conn).await?;
//! ```

pub mod changeset;
pub mod client;
pub mod error;
pub mod filter;
pub mod models;
pub mod password;
pub mod patch;
pub mod qb;
pub mod row;
pub mod trace;
pub mod validate;

#[cfg(feature = "migrate")]
pub mod migrate;

#[cfg(feature = "pool")]
pub mod pool;

pub use changeset::{ValidationCode, ValidationError, ValidationErrors};
pub use client::GenericClient;
pub use error::{StoreError, StoreResult};
pub use filter::{FilterOptions, MAX_BOUND, ResourceKind, build_filter_predicate, filter_expr};
pub use models::{
    Application, ApplicationState, Company, CompanyPatch, Job, JobPatch, NewApplication,
    NewCompany, NewJob, NewUser, User, UserPatch, UserSummary,
};
pub use patch::{Patch, Patchable, apply_patch};
pub use qb::{
    BuiltQuery, DeleteQb, Expr, ExprGroup, FieldValues, InsertQb, SelectQb, SqlQb,
    UpdateQb, sql_for_partial_update,
};
pub use row::{FromRow, RowExt};
pub use trace::TracedClient;

#[cfg(feature = "pool")]
pub use pool::{PgConn, PgPool, create_pool, create_pool_with_config};
