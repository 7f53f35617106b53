//! Redirect URI value types
//!
//! Redirect URIs are stored and exchanged as plain strings of the form
//! `https://<host><path>`. This module gives them structure:
//!
//! - [`RedirectPath`] - a path fragment typed by the administrator (`/callback`)
//! - [`RedirectUri`] - an absolute URI split into host and path, so the host can
//!   be swapped without touching the path suffix
//! - host helpers for the `hostUri` field of a client

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// The only scheme redirect URIs and host URIs are allowed to use.
pub const SCHEME_PREFIX: &str = "https://";

lazy_static! {
    /// One to ten `/segment` groups, each segment 1-20 ASCII alphanumerics.
    static ref REDIRECT_PATH_REGEX: Regex =
        Regex::new(r"^(/[a-zA-Z0-9]{1,20}){1,10}$").unwrap();
}

/// Errors raised while parsing redirect URIs or host values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("'{0}' does not start with https://")]
    MissingScheme(String),

    #[error("redirect URI '{0}' has no path after the host")]
    MissingPath(String),

    #[error("invalid host '{0}'")]
    InvalidHost(String),
}

/// Check whether `input` is an acceptable redirect path fragment.
///
/// The input is trimmed first; an empty result is rejected.
pub fn validate_path(input: &str) -> bool {
    let trimmed = input.trim();
    !trimmed.is_empty() && REDIRECT_PATH_REGEX.is_match(trimmed)
}

/// A validated redirect path fragment such as `/oauth/callback`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RedirectPath(String);

impl RedirectPath {
    /// Trim and validate raw input. Returns `None` when it does not match the grammar.
    pub fn parse(input: &str) -> Option<Self> {
        if validate_path(input) {
            Some(Self(input.trim().to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute URI for this path under `host_uri` (which already carries the scheme).
    pub fn under(&self, host_uri: &str) -> String {
        format!("{}{}", host_uri, self.0)
    }
}

impl fmt::Display for RedirectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An absolute `https://` redirect URI split at the first `/` after the host
///
/// The path keeps everything from that slash onward (query included), so
/// `with_host` swaps the host and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RedirectUri {
    host: String,
    path: String,
}

impl RedirectUri {
    pub fn parse(raw: &str) -> Result<Self, UriError> {
        let rest = raw
            .strip_prefix(SCHEME_PREFIX)
            .ok_or_else(|| UriError::MissingScheme(raw.to_string()))?;

        let slash = rest
            .find('/')
            .ok_or_else(|| UriError::MissingPath(raw.to_string()))?;

        let (host, path) = rest.split_at(slash);
        if host.is_empty() {
            return Err(UriError::InvalidHost(raw.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Same path, different host.
    pub fn with_host(&self, new_host: &str) -> Self {
        Self {
            host: new_host.to_string(),
            path: self.path.clone(),
        }
    }
}

impl fmt::Display for RedirectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", SCHEME_PREFIX, self.host, self.path)
    }
}

impl std::str::FromStr for RedirectUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Host portion of an absolute host URI (`https://a.com` -> `a.com`).
///
/// Values without the scheme prefix are returned unchanged.
pub fn host_portion(host_uri: &str) -> &str {
    host_uri.strip_prefix(SCHEME_PREFIX).unwrap_or(host_uri)
}

/// Absolute host URI for a bare host (`a.com` -> `https://a.com`).
pub fn absolute_host(host: &str) -> String {
    format!("{}{}", SCHEME_PREFIX, host)
}

/// Validate a host typed by the administrator and return it trimmed.
///
/// Accepts `host` or `host:port`; anything carrying a path, query,
/// fragment or credentials is rejected.
pub fn validate_host(input: &str) -> Result<String, UriError> {
    let host = input.trim();
    if host.is_empty() || host.contains(['/', '?', '#', '@']) {
        return Err(UriError::InvalidHost(input.to_string()));
    }

    let url = Url::parse(&absolute_host(host))
        .map_err(|_| UriError::InvalidHost(input.to_string()))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UriError::InvalidHost(input.to_string()));
    }

    Ok(host.to_string())
}

/// Validate an absolute host URI (`https://host[:port]`) and return it trimmed.
pub fn validate_host_uri(input: &str) -> Result<String, UriError> {
    let trimmed = input.trim();
    let host = trimmed
        .strip_prefix(SCHEME_PREFIX)
        .ok_or_else(|| UriError::MissingScheme(input.to_string()))?;
    let host = validate_host(host).map_err(|_| UriError::InvalidHost(input.to_string()))?;
    Ok(absolute_host(&host))
}
