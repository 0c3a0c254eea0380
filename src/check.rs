//! Connectivity probe.
//!
//! Verifies the database is reachable with the configured descriptor and
//! prints what it found: server version, current database and user, and the
//! public tables. Run it before an export, or through a freshly opened
//! tunnel to confirm the forward works.

use anyhow::Result;
use sqlx::{PgPool, Row};

use crate::config::DatabaseConfig;
use crate::db;
use crate::error::ExportError;

/// Probe an open pool and print connection details.
pub async fn probe(pool: &PgPool) -> Result<(), ExportError> {
    let map_err = |source| ExportError::Query {
        table: "pg_catalog",
        source,
    };

    let one: i32 = sqlx::query_scalar("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(map_err)?;
    debug_assert_eq!(one, 1);

    let version: String = sqlx::query_scalar("SELECT version()")
        .fetch_one(pool)
        .await
        .map_err(map_err)?;

    let info = sqlx::query("SELECT current_database(), current_user")
        .fetch_one(pool)
        .await
        .map_err(map_err)?;
    let dbname: String = info.try_get(0).map_err(map_err)?;
    let user: String = info.try_get(1).map_err(map_err)?;

    println!("Connection OK");
    println!("  Server:    {}", version);
    println!("  Database:  {}", dbname);
    println!("  User:      {}", user);

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = 'public' ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
    .map_err(map_err)?;

    if tables.is_empty() {
        println!("  No tables in the public schema");
    } else {
        println!("  Tables ({}):", tables.len());
        for table in &tables {
            println!("    - {}", table);
        }
    }

    Ok(())
}

/// Run the check command against a connection descriptor.
pub async fn run_check(database: &DatabaseConfig) -> Result<()> {
    let pool = db::connect(database).await?;
    let result = probe(&pool).await;
    pool.close().await;
    result?;
    Ok(())
}
