//! Domain entities, value objects, and events
//!
//! - Entities (Client) and wire payloads (ClientData, ClientUpdate)
//! - Value Objects (RedirectPath, RedirectUri, EditSession)
//! - Domain Events (DomainEvent enum for the event bus)

mod client;
mod edit_session;
mod event;
mod redirect_uri;

pub use client::*;
pub use edit_session::*;
pub use event::{DomainEvent, DomainEventEnvelope};
pub use redirect_uri::*;
