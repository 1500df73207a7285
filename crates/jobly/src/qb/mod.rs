//! Query builders for jobly.
//!
//! Every builder allocates `$n` placeholders from one shared parameter list
//! at build time, so fragments compose without string replacement. Building
//! is pure; execution goes through [`SqlQb`] on any
//! [`GenericClient`](crate::GenericClient).
//!
//! ```ignore
//! use jobly::qb;
//!
//! let jobs = qb::select("jobs")
//!     .eq("company_handle", "AAPL")
//!     .order_by("id")
//!     .fetch_all::<Job>(&client)
//!     .await?;
//!
//! qb::delete("jobs").eq("id", job_id).returning("id").query_opt(&client).await?;
//! ```

mod delete;
mod expr;
mod insert;
mod param;
mod select;
mod traits;
mod update;

pub use delete::DeleteQb;
pub use expr::{Expr, ExprGroup};
pub use insert::InsertQb;
pub use param::{Param, ParamList};
pub use select::SelectQb;
pub use traits::{BuiltQuery, SqlQb};
pub use update::{FieldValues, UpdateQb, sql_for_partial_update};

/// Create a SELECT query builder for the given table.
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}

/// Create an INSERT query builder for the given table.
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Create an UPDATE query builder for the given table.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Create a DELETE query builder for the given table.
///
/// Without WHERE conditions the statement is `WHERE 1=0` (no-op).
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}

#[cfg(test)]
mod tests;
