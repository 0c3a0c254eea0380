use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::error::ExportError;

/// Open a small Postgres pool from an injected connection descriptor.
///
/// The connect itself establishes a first connection, so an unreachable or
/// misconfigured endpoint surfaces here as [`ExportError::Connection`]
/// rather than on the first query.
pub async fn connect(db: &DatabaseConfig) -> Result<PgPool, ExportError> {
    let options = PgConnectOptions::new()
        .host(&db.host)
        .port(db.port)
        .username(&db.user)
        .password(&db.password)
        .database(&db.dbname);

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .map_err(ExportError::Connection)?;

    Ok(pool)
}
