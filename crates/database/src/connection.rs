use crate::error::DbError;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

/// How to reach the database and how large the pool may grow.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// Establishes a connection pool to the PostgreSQL database.
///
/// The pool is shared by every query the dashboard issues. `acquire_timeout`
/// bounds how long a query waits for a free connection before failing.
pub async fn connect(settings: &ConnectionSettings) -> Result<PgPool, DbError> {
    if settings.url.trim().is_empty() {
        return Err(DbError::ConnectionConfigError(
            "database url must be set".to_string(),
        ));
    }

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(&settings.url)
        .await?;

    tracing::info!(
        max_connections = settings.max_connections,
        "Connected to the order database."
    );
    Ok(pool)
}
