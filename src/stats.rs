//! Table row counts without writing a file.
//!
//! A quick health overview of the taxonomy database: one count per level
//! table and per rule table. Used by `catx stats` to confirm the schema is
//! populated before running a full export.

use anyhow::Result;
use sqlx::PgPool;

use crate::config::Config;
use crate::db;
use crate::error::ExportError;
use crate::schema::{EXPLANATIONS_TABLE, HARD_LOGIC_TABLE, LEVEL_TABLES, SOFT_LOGIC_TABLE};

async fn count_rows(pool: &PgPool, table: &'static str) -> Result<i64, ExportError> {
    let query = format!("SELECT COUNT(*) FROM {}", table);
    sqlx::query_scalar(&query)
        .fetch_one(pool)
        .await
        .map_err(|source| ExportError::Query { table, source })
}

/// Run the stats command: count every table and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(&config.database).await?;

    let result = collect_and_print(&pool, config).await;
    pool.close().await;
    result
}

async fn collect_and_print(pool: &PgPool, config: &Config) -> Result<()> {
    println!("Category Taxonomy — Database Stats");
    println!("==================================");
    println!();
    println!(
        "  Database:  {} @ {}:{}",
        config.database.dbname, config.database.host, config.database.port
    );
    println!();
    println!("  {:<28} {:>8}", "TABLE", "ROWS");
    println!("  {}", "-".repeat(38));

    let mut total_categories: i64 = 0;
    for table in LEVEL_TABLES {
        let count = count_rows(pool, table).await?;
        total_categories += count;
        println!("  {:<28} {:>8}", table, count);
    }
    println!("  {:<28} {:>8}", "total categories", total_categories);
    println!();

    for table in [HARD_LOGIC_TABLE, SOFT_LOGIC_TABLE, EXPLANATIONS_TABLE] {
        let count = count_rows(pool, table).await?;
        println!("  {:<28} {:>8}", table, count);
    }
    println!();

    Ok(())
}
