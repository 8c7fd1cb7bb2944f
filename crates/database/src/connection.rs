use crate::error::DbError;
use crate::statements::Statements;
use configuration::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The pool is built from the typed settings and verified with a round trip
/// before it is handed out, so a failure here is fatal at startup rather than
/// on the first request.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    if settings.max_connections == 0 {
        return Err(DbError::ConnectionConfigError(
            "max_connections must be at least 1".to_string(),
        ));
    }

    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.name);

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    tracing::info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        "Connected to PostgreSQL."
    );

    Ok(pool)
}

/// Creates the contacts table and its unique email constraint when missing.
pub async fn ensure_schema(pool: &PgPool, statements: &Statements) -> Result<(), DbError> {
    sqlx::query(&statements.create_table).execute(pool).await?;
    tracing::info!(table = %statements.table, "Contacts table is ready.");
    Ok(())
}
