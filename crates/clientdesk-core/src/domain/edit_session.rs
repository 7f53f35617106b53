//! Edit session - staged redirect URI and host edits for one client
//!
//! A session is opened when a client row enters edit mode and closed on
//! commit or cancel. While open, edits go to a [`Staging`] value:
//!
//! - `base` - working copy of the canonical redirect URIs (removals land here)
//! - `pending_adds` - newly added absolute URIs, individually retractable
//! - `host_copy` - the host being edited, without the scheme
//!
//! Closing a session only resets the flags and pending additions; `base` and
//! `host_copy` stay behind until the next [`EditSession::enter`] re-seeds them.

use serde::{Deserialize, Serialize};

use super::client::{Client, ClientUpdate};
use super::redirect_uri::{absolute_host, host_portion, RedirectPath, RedirectUri, UriError};

/// Whether a UI event should keep bubbling to ancestor handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    Continue,
    Stop,
}

/// Staged edits for one client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staging {
    pub base: Vec<String>,
    pub pending_adds: Vec<String>,
    pub host_copy: String,
}

impl Staging {
    /// Seed staging from the client's canonical state
    pub fn seed(client: &Client) -> Self {
        Self {
            base: client.redirect_uris.clone(),
            pending_adds: Vec::new(),
            host_copy: host_portion(&client.host_uri).to_string(),
        }
    }

    /// Staged edits followed by additions, in order, duplicates kept.
    pub fn merged(&self) -> Vec<String> {
        self.base
            .iter()
            .chain(self.pending_adds.iter())
            .cloned()
            .collect()
    }
}

/// Per-client edit state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    /// Row is in edit mode
    pub editable: bool,
    /// Host sub-field is in edit mode
    pub host_editable: bool,
    /// The "new redirect path" input is open
    pub input_open: bool,
    /// `None` until the first time edit mode is entered
    pub staging: Option<Staging>,
}

impl EditSession {
    /// Enter edit mode, discarding any unsaved staging.
    pub fn enter(&mut self, client: &Client) {
        self.editable = true;
        self.staging = Some(Staging::seed(client));
    }

    /// Leave edit mode. Staged base and host copy are left as they are.
    pub fn cancel(&mut self) {
        if let Some(staging) = self.staging.as_mut() {
            staging.pending_adds.clear();
        }
        self.editable = false;
        self.host_editable = false;
    }

    pub fn set_host_editable(&mut self, editable: bool) -> Propagation {
        self.host_editable = editable;
        Propagation::Stop
    }

    /// Stage a new redirect path. Returns `false` (and changes nothing) when
    /// the input does not match the path grammar or no staging exists.
    pub fn add_path(&mut self, host_uri: &str, raw_input: &str) -> bool {
        let Some(path) = RedirectPath::parse(raw_input) else {
            return false;
        };
        let Some(staging) = self.staging.as_mut() else {
            return false;
        };
        staging.pending_adds.push(path.under(host_uri));
        self.input_open = false;
        true
    }

    /// Retract a pending addition. Returns whether anything was removed.
    pub fn remove_new(&mut self, uri: &str) -> bool {
        self.staging
            .as_mut()
            .is_some_and(|s| remove_first(&mut s.pending_adds, uri))
    }

    /// Remove a URI from the staged base list. Returns whether anything was removed.
    pub fn remove_staged(&mut self, uri: &str) -> bool {
        self.staging
            .as_mut()
            .is_some_and(|s| remove_first(&mut s.base, uri))
    }

    /// Collapse the pending input when it is empty.
    pub fn cancel_pending_input(&mut self, current_input: &str) {
        if current_input.is_empty() {
            self.input_open = false;
        }
    }
}

fn remove_first(list: &mut Vec<String>, uri: &str) -> bool {
    match list.iter().position(|u| u == uri) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}

/// Build the update payload for a commit.
///
/// Merges staged base and additions; when the host was edited every URI is
/// moved onto the new host. Any URI that cannot be parsed rejects the whole
/// commit.
pub fn reconcile(current_host_uri: &str, staging: &Staging) -> Result<ClientUpdate, UriError> {
    let merged = staging.merged();

    let redirect_uris = if staging.host_copy != host_portion(current_host_uri) {
        merged
            .iter()
            .map(|raw| {
                RedirectUri::parse(raw).map(|uri| uri.with_host(&staging.host_copy).to_string())
            })
            .collect::<Result<Vec<_>, _>>()?
    } else {
        merged
    };

    Ok(ClientUpdate {
        redirect_uris,
        host_uri: absolute_host(&staging.host_copy),
    })
}

/// Whether committing the session would change anything.
pub fn has_changes(client: &Client, session: &EditSession) -> bool {
    let Some(staging) = session.staging.as_ref() else {
        return true;
    };

    let unchanged = client.redirect_uris == staging.base
        && staging.pending_adds.is_empty()
        && !staging.host_copy.is_empty()
        && host_portion(&client.host_uri) == staging.host_copy;

    !unchanged
}
