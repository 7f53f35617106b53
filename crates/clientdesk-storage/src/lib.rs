//! ClientDesk Storage Layer
//!
//! SQLite-backed implementation of the persistence service used by the
//! client panel.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │             ClientPanel                  │
//! ├──────────────────────────────────────────┤
//! │     ClientRepository (core trait)        │
//! ├──────────────────────────────────────────┤
//! │       SqliteClientRepository             │
//! ├──────────────────────────────────────────┤
//! │        Database (SQLite + migrations)    │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use clientdesk_storage::{Database, SqliteClientRepository};
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//!
//! let db = Arc::new(Mutex::new(Database::open(&path)?));
//! let client_repo = SqliteClientRepository::new(db.clone());
//! ```

mod database;
mod repositories;

pub use database::Database;
pub use repositories::*;

/// Default database file name.
pub const DATABASE_FILE: &str = "clientdesk.db";

/// Get the default database path for the current platform.
pub fn default_database_path() -> Option<std::path::PathBuf> {
    dirs::data_local_dir().map(|p| p.join("clientdesk").join(DATABASE_FILE))
}
