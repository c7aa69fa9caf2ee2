//! # Schema Migrations
//!
//! The store keeps a single table:
//!
//! ```text
//! kv_store
//! ├── key         TEXT PRIMARY KEY
//! ├── value       TEXT              serialized JSON document
//! └── updated_at  TEXT              RFC 3339 timestamp of the last write
//! ```
//!
//! New migrations go in `migrations/` as `NNN_description.sql`. Existing
//! files are never edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StorageResult;

/// Migrations embedded at compile time from `migrations/`.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Applies pending migrations. Safe to call on every open.
pub async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!(
        migrations = MIGRATOR.migrations.len(),
        "Storage schema up to date"
    );
    Ok(())
}
