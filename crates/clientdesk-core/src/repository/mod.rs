//! Repository traits for data access
//!
//! The persistence service behind the client panel. Implementations live in
//! `clientdesk-storage` (SQLite) and in the test crate (in-memory).

use async_trait::async_trait;

use crate::domain::{Client, ClientData, ClientRegistration, ClientUpdate};

/// Result type for repository operations
pub type RepoResult<T> = anyhow::Result<T>;

/// Client repository trait
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Get all clients (secrets may be omitted)
    async fn list(&self) -> RepoResult<Vec<Client>>;

    /// Get the full data (secret + redirect URIs) for a client
    async fn get_data(&self, client_id: &str) -> RepoResult<Option<ClientData>>;

    /// Atomically replace redirect URIs and host URI, returning the stored client
    async fn update(&self, client_id: &str, update: &ClientUpdate) -> RepoResult<Client>;

    /// Register a new client
    async fn create(&self, registration: &ClientRegistration) -> RepoResult<Client>;

    /// Delete a client
    async fn delete(&self, client_id: &str) -> RepoResult<()>;
}
