// Database layer — SQLite storage for the user aggregate and session state.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever TRUTHSHIELD_DB_PATH points
// (defaults to ./truthshield.db).

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use traits::ProfileStore;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (or create) the database, run migrations, and wrap it in the store.
///
/// Called by `truthshield init` and by any command that needs the store.
pub fn initialize_sqlite(db_path: &str) -> Result<Arc<dyn ProfileStore>> {
    // Create parent directories if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    // Enable WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(Arc::new(sqlite::SqliteStore::new(conn)))
}

/// Open an existing database (fails if it doesn't exist yet).
pub fn open_sqlite(db_path: &str) -> Result<Arc<dyn ProfileStore>> {
    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `truthshield init` first.",
            db_path
        );
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::create_tables(&conn)?;

    Ok(Arc::new(sqlite::SqliteStore::new(conn)))
}
