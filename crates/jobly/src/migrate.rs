//! Schema migrations via [`refinery`].
//!
//! The SQL files under `migrations/` are embedded at compile time, so the
//! server binary can bring a fresh database up to date on its own.
//!
//! ```ignore
//! let pool = jobly::create_pool(&database_url)?;
//! let report = jobly::migrate::run_pool(&pool).await?;
//! ```

use crate::error::StoreResult;

pub use refinery::{Report, Runner};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("./migrations");
}

/// A runner over every embedded migration.
pub fn runner() -> Runner {
    embedded::migrations::runner()
}

/// Apply pending migrations on a single connection.
pub async fn run(client: &mut tokio_postgres::Client) -> StoreResult<Report> {
    let report = runner().run_async(client).await?;
    for m in report.applied_migrations() {
        tracing::info!(version = m.version(), name = m.name(), "applied migration");
    }
    Ok(report)
}

/// Acquire a connection from a pool and apply pending migrations on it.
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> StoreResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_migrations_are_ordered() {
        let runner = runner();
        let migrations = runner.get_migrations();
        assert!(!migrations.is_empty());
        assert_eq!(migrations[0].name(), "create_tables");
        assert_eq!(migrations[0].version(), 1);
    }
}
