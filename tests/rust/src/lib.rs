//! Shared test utilities and fixtures for ClientDesk integration tests.

pub use clientdesk_core::domain::{Client, ClientUpdate, DomainEvent};

pub use mocks::MockClientRepository;

/// Panel test harness
pub mod panel {
    use std::sync::Arc;

    use clientdesk_core::{ClientPanel, DomainEvent, EventBus, EventReceiver};

    use crate::mocks::MockClientRepository;

    /// A panel wired to a mock repository with an event subscription
    pub struct PanelHarness {
        pub panel: Arc<ClientPanel>,
        pub repo: Arc<MockClientRepository>,
        pub events: EventReceiver,
    }

    impl PanelHarness {
        /// Build the harness and load the repository's clients into the panel
        pub async fn loaded(repo: MockClientRepository) -> Self {
            let repo = Arc::new(repo);
            let bus = EventBus::new();
            let events = bus.subscribe();
            let panel = Arc::new(ClientPanel::new(repo.clone(), bus.sender()));
            panel.load().await.expect("load should succeed");
            Self {
                panel,
                repo,
                events,
            }
        }

        /// Drain all pending events
        pub fn drain_events(&mut self) -> Vec<DomainEvent> {
            let mut events = Vec::new();
            while let Some(event) = self.events.try_recv() {
                events.push(event);
            }
            events
        }
    }
}

/// Test fixture utilities
pub mod fixtures {
    use super::*;

    /// The single-client scenario: `https://a.com` with one redirect URI
    pub fn scenario_client() -> Client {
        Client::new("c1", "Acme", "https://a.com")
            .with_redirect_uris(["https://a.com/x"])
            .with_secret("secret-c1")
    }

    /// A client with the given id on `https://<host>`
    pub fn client_on(client_id: &str, name: &str, host: &str, paths: &[&str]) -> Client {
        let host_uri = format!("https://{}", host);
        Client::new(client_id, name, host_uri.clone())
            .with_redirect_uris(paths.iter().map(|p| format!("{}{}", host_uri, p)))
            .with_secret(format!("secret-{}", client_id))
    }
}

/// Database test helpers
pub mod db {
    use clientdesk_storage::Database;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Database file name
    const DB_FILE: &str = "clientdesk.db";

    /// A database in a temporary directory, removed on drop
    pub struct TestDatabase {
        pub db: Database,
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestDatabase {
        pub fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let db_path = temp_dir.path().join(DB_FILE);
            let db = Database::open(&db_path).expect("Failed to open test database");
            Self {
                db,
                db_path,
                _temp_dir: temp_dir,
            }
        }

        /// Get the full database file path
        pub fn db_path(&self) -> &Path {
            &self.db_path
        }
    }

    impl Default for TestDatabase {
        fn default() -> Self {
            Self::new()
        }
    }
}
