//! Error types for jobly

use crate::changeset::ValidationErrors;
use thiserror::Error;

/// Result type alias for jobly data-layer operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error types for database and record operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("{0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Caller-supplied input was rejected
    #[error("{0}")]
    Validation(String),

    /// Field-level validation failures for a new record
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),

    /// Attempt to change a record's identity field
    #[error("{0}")]
    Immutable(String),

    /// Username/password pair did not match a user
    #[error("Invalid username/password")]
    InvalidCredentials,

    /// Password hashing or verification failure
    #[error("Password error: {0}")]
    Password(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Migration error
    #[cfg(feature = "migrate")]
    #[error("Migration error: {0}")]
    Migration(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an identity-field immutability error
    pub fn immutable(message: impl Into<String>) -> Self {
        Self::Immutable(message.into())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a validation error (message or field-level)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Invalid(_))
    }

    /// Check if this is an identity-field immutability error
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Immutable(_))
    }

    /// Parse a tokio_postgres error into a more specific StoreError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(feature = "migrate")]
impl From<refinery::Error> for StoreError {
    fn from(err: refinery::Error) -> Self {
        Self::Migration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_pass_through_for_client_facing_variants() {
        assert_eq!(
            StoreError::validation("Min cannot be greater than max").to_string(),
            "Min cannot be greater than max"
        );
        assert_eq!(
            StoreError::immutable("Can't change job id!").to_string(),
            "Can't change job id!"
        );
        assert_eq!(
            StoreError::not_found("Cannot find job by that id").to_string(),
            "Cannot find job by that id"
        );
    }

    #[test]
    fn predicates_match_variants() {
        assert!(StoreError::validation("x").is_validation());
        assert!(StoreError::immutable("x").is_immutable());
        assert!(StoreError::not_found("x").is_not_found());
        assert!(!StoreError::Other("x".into()).is_not_found());
        assert!(StoreError::UniqueViolation("users_email_key".into()).is_unique_violation());
    }

    #[test]
    fn decode_carries_column() {
        let err = StoreError::decode("salary", "invalid type");
        assert_eq!(
            err.to_string(),
            "Decode error on column 'salary': invalid type"
        );
    }
}
