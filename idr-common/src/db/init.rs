//! Database initialization
//!
//! Creates the database file and schema on first run; safe to call again on
//! an existing database.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize the database connection pool and create tables if needed.
///
/// Every pooled connection gets WAL journaling, foreign key enforcement,
/// and a busy timeout. WAL allows concurrent readers alongside the single
/// writer; a reconciliation transaction that loses a write race gets a
/// transient lock error and is retried by the resolver.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_contacts_table(&pool).await?;

    Ok(pool)
}

/// Create the contacts table
///
/// One row per submitted identifying record. A secondary row links to its
/// cluster's primary through `linked_id`; a primary row has no link.
/// `created_at`/`updated_at` are milliseconds since the Unix epoch;
/// creation order (ties broken by id) drives every precedence decision.
pub async fn create_contacts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT,
            phone_number TEXT,
            linked_id INTEGER REFERENCES contacts(id),
            link_precedence TEXT NOT NULL CHECK (link_precedence IN ('primary', 'secondary')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            CHECK (email IS NOT NULL OR phone_number IS NOT NULL),
            CHECK ((link_precedence = 'primary') = (linked_id IS NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for the two lookup predicates and cluster expansion
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_phone ON contacts(phone_number)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contacts_linked_id ON contacts(linked_id)")
        .execute(pool)
        .await?;

    Ok(())
}
