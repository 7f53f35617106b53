//! SQLite implementation of ClientRepository.
//!
//! Redirect URIs are stored as a JSON array in a single column so an update
//! replaces host and redirect list in one statement.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clientdesk_core::{Client, ClientData, ClientRegistration, ClientRepository, ClientUpdate};
use rusqlite::{params, types::Type, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::Database;

const CLIENT_COLUMNS: &str =
    "client_id, name, secret, host_uri, redirect_uris, created_at, updated_at";

/// SQLite-backed implementation of ClientRepository.
pub struct SqliteClientRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteClientRepository {
    /// Create a new SQLite client repository.
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// Parse a datetime string to DateTime<Utc>.
    fn parse_datetime(s: &str) -> DateTime<Utc> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return dt.with_timezone(&Utc);
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return dt.and_utc();
        }
        Utc::now()
    }

    /// Map a row selected with `CLIENT_COLUMNS` to a Client.
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Client> {
        let redirect_uris_json: String = row.get(4)?;
        let redirect_uris = serde_json::from_str(&redirect_uris_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
        })?;
        Ok(Client {
            client_id: row.get(0)?,
            name: row.get(1)?,
            secret: Some(row.get(2)?),
            host_uri: row.get(3)?,
            redirect_uris,
            created_at: Self::parse_datetime(&row.get::<_, String>(5)?),
            updated_at: Self::parse_datetime(&row.get::<_, String>(6)?),
        })
    }

    fn select_client(conn: &rusqlite::Connection, client_id: &str) -> Result<Option<Client>> {
        let client = conn
            .query_row(
                &format!("SELECT {} FROM clients WHERE client_id = ?1", CLIENT_COLUMNS),
                params![client_id],
                Self::map_row,
            )
            .optional()?;
        Ok(client)
    }

    fn generate_secret() -> String {
        format!("cd_{}", Uuid::new_v4().simple())
    }
}

#[async_trait]
impl ClientRepository for SqliteClientRepository {
    async fn list(&self) -> Result<Vec<Client>> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM clients ORDER BY name ASC",
            CLIENT_COLUMNS
        ))?;

        // The list view never carries secrets; they are fetched on expand.
        let clients = stmt
            .query_map([], Self::map_row)?
            .map(|row| {
                row.map(|mut client| {
                    client.secret = None;
                    client
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(clients)
    }

    async fn get_data(&self, client_id: &str) -> Result<Option<ClientData>> {
        let db = self.db.lock().await;
        let client = Self::select_client(db.connection(), client_id)?;

        Ok(client.map(|c| ClientData {
            client_id: c.client_id,
            secret: c.secret.unwrap_or_default(),
            redirect_uris: c.redirect_uris,
        }))
    }

    async fn update(&self, client_id: &str, update: &ClientUpdate) -> Result<Client> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let changed = conn.execute(
            "UPDATE clients SET host_uri = ?1, redirect_uris = ?2, updated_at = ?3
             WHERE client_id = ?4",
            params![
                update.host_uri,
                serde_json::to_string(&update.redirect_uris)?,
                Utc::now().to_rfc3339(),
                client_id,
            ],
        )?;

        if changed == 0 {
            return Err(anyhow!("Client not found: {}", client_id));
        }

        debug!(client_id, "Updated client redirect URIs");

        Self::select_client(conn, client_id)?
            .ok_or_else(|| anyhow!("Client not found: {}", client_id))
    }

    async fn create(&self, registration: &ClientRegistration) -> Result<Client> {
        let client = Client::new(
            Uuid::new_v4().to_string(),
            registration.name.clone(),
            registration.host_uri.clone(),
        )
        .with_redirect_uris(registration.redirect_uris.iter().cloned())
        .with_secret(Self::generate_secret());

        let db = self.db.lock().await;
        db.connection().execute(
            "INSERT INTO clients (client_id, name, secret, host_uri, redirect_uris, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                client.client_id,
                client.name,
                client.secret,
                client.host_uri,
                serde_json::to_string(&client.redirect_uris)?,
                client.created_at.to_rfc3339(),
                client.updated_at.to_rfc3339(),
            ],
        )?;

        info!(client_id = %client.client_id, name = %client.name, "Registered client");

        Ok(client)
    }

    async fn delete(&self, client_id: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM clients WHERE client_id = ?1", params![client_id])?;

        info!(client_id, "Deleted client");
        Ok(())
    }
}
