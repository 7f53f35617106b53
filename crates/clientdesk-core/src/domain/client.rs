//! Client entity - OAuth client registrations managed from the panel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Avatar colors, indexed by the lowercase first letter of the client name.
const COLORS: [&str; 26] = [
    "#EF5350", "#C62828", "#EC407A", "#AB47BC", "#7E57C2", "#5C6BC0", "#3D5AFE", "#1976D2",
    "#0277BD", "#0097A7", "#00897B", "#388E3C", "#558B2F", "#FF7043", "#BF360C", "#8D6E63",
    "#757575", "#78909C", "#000000", "#29B6F6", "#7C4DFF", "#FF5252", "#EC407A", "#388E3C",
    "#558B2F", "#1976D2",
];

/// Color for names that do not start with an ASCII letter
const FALLBACK_COLOR: &str = "#757575";

/// A registered OAuth client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Opaque unique identifier
    pub client_id: String,

    /// Human-readable name
    pub name: String,

    /// Absolute base URI (`https://host`)
    pub host_uri: String,

    /// Canonical redirect URIs, each `host_uri` + path
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Client secret, only present once the client data has been fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Create a new client with no redirect URIs and no secret
    pub fn new(
        client_id: impl Into<String>,
        name: impl Into<String>,
        host_uri: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            client_id: client_id.into(),
            name: name.into(),
            host_uri: host_uri.into(),
            redirect_uris: Vec::new(),
            secret: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set redirect URIs
    pub fn with_redirect_uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redirect_uris = uris.into_iter().map(Into::into).collect();
        self
    }

    /// Set the secret
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Whether the secret (and full redirect list) still has to be fetched
    pub fn needs_data(&self) -> bool {
        self.secret.is_none()
    }

    /// Merge fetched data into this client
    pub fn apply_data(&mut self, data: ClientData) {
        self.secret = Some(data.secret);
        self.redirect_uris = data.redirect_uris;
    }
}

/// Full client data returned by the persistence service on expand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    pub client_id: String,
    pub secret: String,
    pub redirect_uris: Vec<String>,
}

/// Registration request for a new client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRegistration {
    pub name: String,
    pub host_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// Update payload submitted on commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    pub redirect_uris: Vec<String>,
    pub host_uri: String,
}

/// Presentation attributes derived from the client name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    pub color: String,
    pub avatar_name: String,
}

impl ClientView {
    pub fn from_client(client: &Client) -> Self {
        Self::from_name(&client.name)
    }

    pub fn from_name(name: &str) -> Self {
        let color = name
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .filter(char::is_ascii_lowercase)
            .map(|c| COLORS[(c as u8 - b'a') as usize])
            .unwrap_or(FALLBACK_COLOR);

        // Single-word names get their last letter repeated so avatars
        // always have two initials to draw from.
        let avatar_name = if name.contains(' ') {
            name.to_string()
        } else {
            match name.chars().last() {
                Some(last) => format!("{} {}", name, last),
                None => String::new(),
            }
        };

        Self {
            color: color.to_string(),
            avatar_name,
        }
    }
}
