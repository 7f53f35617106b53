//! Application configuration
//!
//! Resolved once at startup from the environment (a `.env` file is loaded
//! first when present).
//!
//! | Variable              | Default                                   |
//! |-----------------------|-------------------------------------------|
//! | `CLIENTDESK_DB_PATH`  | `<data_local_dir>/clientdesk/clientdesk.db` |
//! | `CLIENTDESK_LOG_DIR`  | `<data_local_dir>/clientdesk/logs`        |

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DB_PATH_VAR: &str = "CLIENTDESK_DB_PATH";
pub const LOG_DIR_VAR: &str = "CLIENTDESK_LOG_DIR";

/// Application data directory name under the platform's local data dir
const APP_DIR: &str = "clientdesk";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub logs_dir: PathBuf,
}

impl AppConfig {
    /// Load `.env` (if any) and resolve the configuration.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve with an explicit variable lookup.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = match lookup(DB_PATH_VAR).filter(|v| !v.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => clientdesk_storage::default_database_path()
                .context("Cannot determine a data directory; set CLIENTDESK_DB_PATH")?,
        };

        let logs_dir = match lookup(LOG_DIR_VAR).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => app_data_dir().join("logs"),
        };

        Ok(Self {
            database_path,
            logs_dir,
        })
    }
}

fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
