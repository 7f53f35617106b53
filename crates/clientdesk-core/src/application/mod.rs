//! Application Services - orchestration layer with event emission
//!
//! Application services sit between the front-end (the command dispatcher)
//! and the domain layer (repositories, edit sessions). They:
//!
//! 1. **Orchestrate** user actions against the domain and persistence
//! 2. **Emit events** after state changes via the event bus
//! 3. **Validate** inputs and enforce session rules
//!
//! ```text
//! Front-end (command dispatcher)
//!         │
//!         ▼
//! ┌─────────────────────────┐
//! │  ClientPanel            │──► Event Bus ──► notifier, audit log
//! └───────────┬─────────────┘
//!             ▼
//! Persistence (ClientRepository)
//! ```

mod client_panel;

pub use client_panel::{ClientPanel, PanelEntry, PanelError, PanelResult};

use std::sync::Arc;

use crate::event_bus::EventBus;
use crate::repository::ClientRepository;

/// Builder for creating application services with shared dependencies
pub struct ApplicationServicesBuilder {
    event_bus: Option<Arc<EventBus>>,
    client_repo: Option<Arc<dyn ClientRepository>>,
}

impl ApplicationServicesBuilder {
    pub fn new() -> Self {
        Self {
            event_bus: None,
            client_repo: None,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn with_client_repo(mut self, repo: Arc<dyn ClientRepository>) -> Self {
        self.client_repo = Some(repo);
        self
    }

    /// Build all application services
    pub fn build(self) -> anyhow::Result<ApplicationServices> {
        let event_bus = self
            .event_bus
            .ok_or_else(|| anyhow::anyhow!("Event bus required"))?;
        let client_repo = self
            .client_repo
            .ok_or_else(|| anyhow::anyhow!("Client repository required"))?;

        Ok(ApplicationServices {
            panel: ClientPanel::new(client_repo, event_bus.sender()),
            event_bus,
        })
    }
}

impl Default for ApplicationServicesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all application services
pub struct ApplicationServices {
    /// Shared event bus
    pub event_bus: Arc<EventBus>,
    /// Client panel
    pub panel: ClientPanel,
}

impl ApplicationServices {
    /// Subscribe to events from all services
    pub fn subscribe(&self) -> crate::event_bus::EventReceiver {
        self.event_bus.subscribe()
    }
}
