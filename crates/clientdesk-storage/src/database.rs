//! SQLite connection and schema migrations.
//!
//! Migration files live in `migrations/` and are embedded at build time.
//! They are applied in version order and recorded in `schema_migrations`;
//! add a new file plus an entry in `MIGRATIONS` to extend the schema.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::{debug, info};

/// Embedded migrations: (version, name, sql).
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "initial",
    include_str!("migrations/001_initial.sql"),
)];

const MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
)";

/// SQLite database holding the client registrations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        debug!(path = %path.display(), "[Database] Opened");
        Self::prepare(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute(MIGRATIONS_TABLE, [])?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let applied = self.schema_version()?;

        for &(version, name, sql) in MIGRATIONS.iter().filter(|&&(v, _, _)| v > applied) {
            let tx = self.conn.unchecked_transaction()?;
            tx.execute_batch(sql)
                .with_context(|| format!("Migration {} ({}) failed", version, name))?;
            tx.execute(
                "INSERT INTO schema_migrations (version, name, applied_at)
                 VALUES (?1, ?2, datetime('now'))",
                params![version, name],
            )?;
            tx.commit()?;

            info!(version, name, "[Database] Applied migration");
        }

        Ok(())
    }

    /// Highest applied migration version, 0 for an empty database.
    pub fn schema_version(&self) -> Result<i64> {
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
