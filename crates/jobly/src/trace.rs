//! SQL tracing for any [`GenericClient`].
//!
//! Wrap a connection in [`TracedClient`] to emit a `tracing` event under the
//! `jobly.sql` target for every statement, with the parameter count, row
//! count and elapsed time. Statements slower than the configured threshold
//! are logged at WARN.

use crate::client::GenericClient;
use crate::error::StoreResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Cut `sql` to at most `max_bytes`, respecting char boundaries.
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A [`GenericClient`] that logs each statement before delegating.
#[derive(Debug, Clone)]
pub struct TracedClient<C> {
    inner: C,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    max_sql_length: Option<usize>,
    slow_threshold: Duration,
}

impl<C: GenericClient> TracedClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            max_sql_length: Some(200),
            slow_threshold: Duration::from_millis(500),
        }
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Statements at or above this duration are logged at WARN.
    pub fn slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn display_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn finish(&self, sql: &str, param_count: usize, started: Instant, outcome: Result<u64, &str>) {
        let elapsed = started.elapsed();
        let sql = self.display_sql(sql);
        match outcome {
            Ok(rows) if elapsed >= self.slow_threshold => tracing::warn!(
                target: "jobly.sql",
                param_count,
                rows,
                elapsed_ms = elapsed.as_millis() as u64,
                sql = %sql,
                "slow query"
            ),
            Ok(rows) => tracing::debug!(
                target: "jobly.sql",
                param_count,
                rows,
                elapsed_ms = elapsed.as_millis() as u64,
                sql = %sql,
            ),
            Err(error) => tracing::debug!(
                target: "jobly.sql",
                param_count,
                elapsed_ms = elapsed.as_millis() as u64,
                sql = %sql,
                error,
                "query failed"
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for TracedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        let started = Instant::now();
        let result = self.inner.query(sql, params).await;
        match &result {
            Ok(rows) => self.finish(sql, params.len(), started, Ok(rows.len() as u64)),
            Err(e) => self.finish(sql, params.len(), started, Err(&e.to_string())),
        }
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        let started = Instant::now();
        let result = self.inner.execute(sql, params).await;
        match &result {
            Ok(n) => self.finish(sql, params.len(), started, Ok(*n)),
            Err(e) => self.finish(sql, params.len(), started, Err(&e.to_string())),
        }
        result
    }
}
