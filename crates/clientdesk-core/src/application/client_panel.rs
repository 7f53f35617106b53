//! Client Panel Application Service
//!
//! Owns the displayed client collection and the per-client edit sessions.
//! Every operation corresponds to one discrete user action; the only
//! suspension points are the calls to the persistence service.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{
    has_changes, reconcile, validate_host, Client, ClientView, DomainEvent, EditSession,
    Propagation, UriError,
};
use crate::event_bus::EventSender;
use crate::repository::ClientRepository;

/// Errors returned by panel operations
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("client not found: {0}")]
    UnknownClient(String),

    #[error("client {0} is not in edit mode")]
    NotEditing(String),

    #[error("a save is already in flight for client {0}")]
    SaveInFlight(String),

    #[error("client {0} is already listed")]
    DuplicateClient(String),

    #[error("invalid host: {0}")]
    InvalidHost(#[source] UriError),

    #[error("cannot rewrite redirect URIs: {0}")]
    MalformedRedirectUri(#[source] UriError),

    #[error("persistence service error: {0}")]
    Persistence(#[from] anyhow::Error),
}

pub type PanelResult<T> = Result<T, PanelError>;

/// One row of the panel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelEntry {
    pub client: Client,
    pub view: ClientView,
    pub session: EditSession,
    /// Added during this panel's lifetime via registration
    pub is_new: bool,
    /// A commit for this client is awaiting the persistence service
    pub saving: bool,
}

impl PanelEntry {
    fn new(client: Client) -> Self {
        Self {
            view: ClientView::from_client(&client),
            client,
            session: EditSession::default(),
            is_new: false,
            saving: false,
        }
    }

    pub fn has_changes(&self) -> bool {
        has_changes(&self.client, &self.session)
    }

    /// Staging may only change while the row is in edit mode and no commit
    /// is waiting on the persistence service.
    fn require_editing(&self) -> PanelResult<()> {
        if !self.session.editable {
            return Err(PanelError::NotEditing(self.client.client_id.clone()));
        }
        if self.saving {
            return Err(PanelError::SaveInFlight(self.client.client_id.clone()));
        }
        Ok(())
    }
}

/// Application service behind the client panel
pub struct ClientPanel {
    client_repo: Arc<dyn ClientRepository>,
    event_sender: EventSender,
    entries: RwLock<Vec<PanelEntry>>,
}

impl ClientPanel {
    pub fn new(client_repo: Arc<dyn ClientRepository>, event_sender: EventSender) -> Self {
        Self {
            client_repo,
            event_sender,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Run `f` against the entry for `client_id` under the write lock.
    fn with_entry<T>(
        &self,
        client_id: &str,
        f: impl FnOnce(&mut PanelEntry) -> PanelResult<T>,
    ) -> PanelResult<T> {
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.client.client_id == client_id)
            .ok_or_else(|| PanelError::UnknownClient(client_id.to_string()))?;
        f(entry)
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// Replace the displayed collection with the persistence service's list.
    ///
    /// Emits: `ClientsLoaded`
    pub async fn load(&self) -> PanelResult<usize> {
        let clients = self.client_repo.list().await?;
        let count = clients.len();

        let mut entries = self.entries.write();
        let mut previous = std::mem::take(&mut *entries);
        *entries = clients
            .into_iter()
            .map(|client| {
                let mut entry = PanelEntry::new(client);
                // Open sessions and in-flight commits survive a reload.
                if let Some(index) = previous
                    .iter()
                    .position(|p| p.client.client_id == entry.client.client_id)
                {
                    let old = previous.swap_remove(index);
                    entry.session = old.session;
                    entry.saving = old.saving;
                    entry.is_new = old.is_new;
                }
                entry
            })
            .collect();
        drop(entries);

        info!(count, "[ClientPanel] Loaded clients");
        self.event_sender.emit(DomainEvent::ClientsLoaded { count });
        Ok(count)
    }

    /// Fetch secret and redirect URIs for a client that does not have them yet.
    ///
    /// Returns `false` when nothing had to be (or could be) fetched.
    ///
    /// Emits: `ClientDataFetched`
    pub async fn fetch_client_data(&self, client_id: &str) -> PanelResult<bool> {
        let needs_data = self.with_entry(client_id, |entry| Ok(entry.client.needs_data()))?;
        if !needs_data {
            return Ok(false);
        }

        let Some(data) = self.client_repo.get_data(client_id).await? else {
            warn!(client_id, "[ClientPanel] No data returned for client");
            return Ok(false);
        };

        self.with_entry(client_id, |entry| {
            entry.client.apply_data(data);
            Ok(())
        })?;

        debug!(client_id, "[ClientPanel] Fetched client data");
        self.event_sender.emit(DomainEvent::ClientDataFetched {
            client_id: client_id.to_string(),
        });
        Ok(true)
    }

    /// Add a client returned by the registration dialog.
    ///
    /// A client id that is already listed is rejected.
    ///
    /// Emits: `ClientAdmitted`
    pub fn admit(&self, client: Client) -> PanelResult<()> {
        let event = DomainEvent::ClientAdmitted {
            client_id: client.client_id.clone(),
            client_name: client.name.clone(),
        };

        {
            let mut entries = self.entries.write();
            if entries.iter().any(|e| e.client.client_id == client.client_id) {
                return Err(PanelError::DuplicateClient(client.client_id));
            }
            let mut entry = PanelEntry::new(client);
            entry.is_new = true;
            entries.push(entry);
        }

        self.event_sender.emit(event);
        Ok(())
    }

    /// Snapshot of all rows, in display order
    pub fn clients(&self) -> Vec<PanelEntry> {
        self.entries.read().clone()
    }

    /// Snapshot of one row
    pub fn entry(&self, client_id: &str) -> Option<PanelEntry> {
        self.entries
            .read()
            .iter()
            .find(|e| e.client.client_id == client_id)
            .cloned()
    }

    // =========================================================================
    // Session control
    // =========================================================================

    /// Enter edit mode, re-seeding staging from canonical state.
    ///
    /// Emits: `EditStarted`
    pub fn enter_edit(&self, client_id: &str) -> PanelResult<()> {
        self.with_entry(client_id, |entry| {
            if entry.saving {
                return Err(PanelError::SaveInFlight(client_id.to_string()));
            }
            entry.session.enter(&entry.client);
            Ok(())
        })?;

        debug!(client_id, "[ClientPanel] Entered edit mode");
        self.event_sender.emit(DomainEvent::EditStarted {
            client_id: client_id.to_string(),
        });
        Ok(())
    }

    /// Leave edit mode, dropping pending additions.
    ///
    /// Emits: `EditCancelled`
    pub fn cancel_edit(&self, client_id: &str) -> PanelResult<()> {
        self.with_entry(client_id, |entry| {
            entry.session.cancel();
            Ok(())
        })?;

        debug!(client_id, "[ClientPanel] Left edit mode");
        self.event_sender.emit(DomainEvent::EditCancelled {
            client_id: client_id.to_string(),
        });
        Ok(())
    }

    /// Open the host sub-field. The triggering event must not bubble.
    pub fn set_host_editable(&self, client_id: &str) -> PanelResult<Propagation> {
        self.with_entry(client_id, |entry| Ok(entry.session.set_host_editable(true)))
    }

    /// Close the host sub-field. The triggering event must not bubble.
    pub fn clear_host_editable(&self, client_id: &str) -> PanelResult<Propagation> {
        self.with_entry(client_id, |entry| Ok(entry.session.set_host_editable(false)))
    }

    /// Stage a new host (without scheme) for the client being edited.
    pub fn edit_host(&self, client_id: &str, host: &str) -> PanelResult<()> {
        let host = validate_host(host).map_err(PanelError::InvalidHost)?;
        self.with_entry(client_id, |entry| {
            entry.require_editing()?;
            if let Some(staging) = entry.session.staging.as_mut() {
                staging.host_copy = host;
            }
            Ok(())
        })
    }

    // =========================================================================
    // Redirect path editing
    // =========================================================================

    /// Show the input for a new redirect path.
    pub fn open_pending_input(&self, client_id: &str) -> PanelResult<()> {
        self.with_entry(client_id, |entry| {
            entry.session.input_open = true;
            Ok(())
        })
    }

    /// Stage `host_uri + trim(raw_input)` as a new redirect URI.
    ///
    /// Input that does not match the path grammar is dropped and `Ok(false)`
    /// is returned; it is not an error.
    pub fn add_path(&self, client_id: &str, raw_input: &str) -> PanelResult<bool> {
        let added = self.with_entry(client_id, |entry| {
            entry.require_editing()?;
            Ok(entry.session.add_path(&entry.client.host_uri, raw_input))
        })?;

        if !added {
            debug!(client_id, input = raw_input, "[ClientPanel] Rejected redirect path");
        }
        Ok(added)
    }

    /// Retract a pending addition (first exact match). Absent URIs are a no-op.
    pub fn remove_new_path(&self, client_id: &str, uri: &str) -> PanelResult<bool> {
        self.with_entry(client_id, |entry| {
            entry.require_editing()?;
            Ok(entry.session.remove_new(uri))
        })
    }

    /// Remove an existing URI from the staged list (first exact match).
    pub fn remove_staged_path(&self, client_id: &str, uri: &str) -> PanelResult<bool> {
        self.with_entry(client_id, |entry| {
            entry.require_editing()?;
            Ok(entry.session.remove_staged(uri))
        })
    }

    /// Collapse the pending input if nothing has been typed into it.
    pub fn cancel_pending_input(&self, client_id: &str, current_input: &str) -> PanelResult<()> {
        self.with_entry(client_id, |entry| {
            entry.session.cancel_pending_input(current_input);
            Ok(())
        })
    }

    // =========================================================================
    // Change detection and commit
    // =========================================================================

    /// Whether a commit would change anything for this client.
    pub fn has_changes(&self, client_id: &str) -> PanelResult<bool> {
        self.with_entry(client_id, |entry| Ok(entry.has_changes()))
    }

    /// Reconcile staged edits and submit them to the persistence service.
    ///
    /// On success the server-returned redirect URIs become canonical and the
    /// session is closed. On failure the session stays open with its staging
    /// intact so the save can be retried.
    ///
    /// Emits: `ClientUpdated` or `ClientUpdateFailed`
    pub async fn save_changes(&self, client_id: &str) -> PanelResult<Client> {
        let prepared = self.with_entry(client_id, |entry| {
            entry.require_editing()?;
            let staging = entry
                .session
                .staging
                .as_ref()
                .ok_or_else(|| PanelError::NotEditing(client_id.to_string()))?;
            let update = reconcile(&entry.client.host_uri, staging)
                .map_err(PanelError::MalformedRedirectUri)?;
            entry.saving = true;
            Ok(update)
        });

        let update = match prepared {
            Ok(update) => update,
            Err(e @ PanelError::MalformedRedirectUri(_)) => {
                self.emit_update_failed(client_id, &e);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        debug!(
            client_id,
            redirect_uris = update.redirect_uris.len(),
            host_uri = %update.host_uri,
            "[ClientPanel] Submitting client update"
        );

        let result = self.client_repo.update(client_id, &update).await;

        let committed = self.with_entry(client_id, |entry| {
            entry.saving = false;
            match result {
                Ok(stored) => {
                    entry.client.redirect_uris = stored.redirect_uris;
                    entry.client.host_uri = update.host_uri.clone();
                    entry.client.updated_at = stored.updated_at;
                    entry.session.cancel();
                    Ok(entry.client.clone())
                }
                Err(e) => Err(PanelError::Persistence(e)),
            }
        });

        match &committed {
            Ok(client) => {
                info!(
                    client_id,
                    host_uri = %client.host_uri,
                    "[ClientPanel] Updated client"
                );
                self.event_sender.emit(DomainEvent::ClientUpdated {
                    client_id: client_id.to_string(),
                    host_uri: client.host_uri.clone(),
                    redirect_uris: client.redirect_uris.clone(),
                });
            }
            Err(e) => self.emit_update_failed(client_id, e),
        }

        committed
    }

    fn emit_update_failed(&self, client_id: &str, error: &PanelError) {
        warn!(client_id, error = %error, "[ClientPanel] Client update failed");
        self.event_sender.emit(DomainEvent::ClientUpdateFailed {
            client_id: client_id.to_string(),
            reason: error.to_string(),
        });
    }

    /// Get the event sender
    pub fn event_sender(&self) -> &EventSender {
        &self.event_sender
    }
}
