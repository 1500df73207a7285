//! Trait definitions for query builders.

use crate::client::GenericClient;
use crate::error::StoreResult;
use crate::qb::param::ParamList;
use crate::row::FromRow;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// The result of building a query: SQL text plus its positional parameters.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: ParamList,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: String, params: ParamList) -> Self {
        Self { sql, params }
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.as_refs()
    }
}

/// Base trait for all query builders.
///
/// Provides methods for building SQL and executing queries.
pub trait SqlQb: Sync {
    /// Build the SQL string and parameters.
    fn build(&self) -> BuiltQuery;

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> String {
        self.build().sql
    }

    /// Validate builder state before execution.
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Execute query and return all rows.
    fn query(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = StoreResult<Vec<Row>>> + Send {
        async move {
            self.validate()?;
            let built = self.build();
            conn.query(&built.sql, &built.params_ref()).await
        }
    }

    /// Execute query and return at most one row.
    fn query_opt(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = StoreResult<Option<Row>>> + Send {
        async move {
            self.validate()?;
            let built = self.build();
            conn.query_opt(&built.sql, &built.params_ref()).await
        }
    }

    /// Execute query and map the first row to `T` ([`StoreError::NotFound`] when empty).
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn fetch_one<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = StoreResult<T>> + Send {
        async move {
            self.validate()?;
            let built = self.build();
            let row = conn.query_one(&built.sql, &built.params_ref()).await?;
            T::from_row(&row)
        }
    }

    /// Execute query and map all rows to `T`.
    fn fetch_all<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = StoreResult<Vec<T>>> + Send {
        async move {
            let rows = self.query(conn).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// Execute query and map at most one row to `T`.
    fn fetch_opt<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = StoreResult<Option<T>>> + Send {
        async move {
            let row = self.query_opt(conn).await?;
            row.as_ref().map(T::from_row).transpose()
        }
    }
}
