use analytics::AnalyticsError;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("A row could not be mapped to a domain record: {0}")]
    InvalidRow(String),
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        DbError::InvalidRow(err.to_string())
    }
}

/// Every database failure surfaces to the analytics layer as an unavailable store.
impl From<DbError> for AnalyticsError {
    fn from(err: DbError) -> Self {
        AnalyticsError::StorageUnavailable(err.to_string())
    }
}
