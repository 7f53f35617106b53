//! Domain Events
//!
//! Everything the client panel does that a consumer might care about is
//! emitted as a [`DomainEvent`] on the event bus. Consumers include the
//! notification toast renderer and audit logging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All domain events emitted by the client panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Client list (re)loaded from the persistence service
    ClientsLoaded { count: usize },

    /// Secret and redirect URIs fetched for a client
    ClientDataFetched { client_id: String },

    /// A freshly registered client was added to the panel
    ClientAdmitted {
        client_id: String,
        client_name: String,
    },

    /// A client row entered edit mode
    EditStarted { client_id: String },

    /// Edit mode left without committing
    EditCancelled { client_id: String },

    /// Commit accepted by the persistence service
    ClientUpdated {
        client_id: String,
        host_uri: String,
        redirect_uris: Vec<String>,
    },

    /// Commit failed; the edit session is still open
    ClientUpdateFailed { client_id: String, reason: String },
}

impl DomainEvent {
    /// Get the event type name (for logging/debugging)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ClientsLoaded { .. } => "clients_loaded",
            Self::ClientDataFetched { .. } => "client_data_fetched",
            Self::ClientAdmitted { .. } => "client_admitted",
            Self::EditStarted { .. } => "edit_started",
            Self::EditCancelled { .. } => "edit_cancelled",
            Self::ClientUpdated { .. } => "client_updated",
            Self::ClientUpdateFailed { .. } => "client_update_failed",
        }
    }

    /// Extract client_id if this event relates to one client
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::ClientDataFetched { client_id }
            | Self::ClientAdmitted { client_id, .. }
            | Self::EditStarted { client_id }
            | Self::EditCancelled { client_id }
            | Self::ClientUpdated { client_id, .. }
            | Self::ClientUpdateFailed { client_id, .. } => Some(client_id),
            Self::ClientsLoaded { .. } => None,
        }
    }

    /// Toast text for the notification service, if the event warrants one
    pub fn notification(&self) -> Option<String> {
        match self {
            Self::ClientUpdated { .. } => Some("Client was updated successfully".to_string()),
            Self::ClientUpdateFailed { reason, .. } => {
                Some(format!("Failed to update client: {}", reason))
            }
            Self::ClientAdmitted { client_name, .. } => {
                Some(format!("Client {} was registered", client_name))
            }
            _ => None,
        }
    }
}

/// Event with metadata for transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEventEnvelope {
    pub event: DomainEvent,
    pub timestamp: DateTime<Utc>,
}

impl DomainEventEnvelope {
    pub fn new(event: DomainEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}
