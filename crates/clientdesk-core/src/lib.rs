//! # ClientDesk Core Library
//!
//! Domain logic for the OAuth client administration panel.
//!
//! ## Modules
//!
//! - `domain` - Client entity, redirect URI values, edit sessions, events
//! - `repository` - Persistence service trait
//! - `application` - The client panel service
//! - `event_bus` - Event distribution to notifiers and loggers

pub mod application;
pub mod domain;
pub mod event_bus;
pub mod repository;

// Re-export commonly used types
pub use domain::*;
pub use repository::*;

pub use application::{
    ApplicationServices, ApplicationServicesBuilder, ClientPanel, PanelEntry, PanelError,
    PanelResult,
};
pub use event_bus::{EventBus, EventReceiver, EventSender};
