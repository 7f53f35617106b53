//! Event Bus - fans panel events out to independent consumers
//!
//! The panel emits through an [`EventSender`]; the console notifier and the
//! test harness each hold their own [`EventReceiver`]. Events emitted before
//! a receiver subscribed are not replayed.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{trace, warn};

use crate::DomainEvent;

/// Events buffered per receiver before the slowest one starts lagging
const CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    channel: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (channel, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { channel }
    }

    /// Handle for producers
    pub fn sender(&self) -> EventSender {
        EventSender {
            channel: self.channel.clone(),
        }
    }

    /// New receiver that sees every event emitted from now on
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            channel: self.channel.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side, held by application services
#[derive(Clone)]
pub struct EventSender {
    channel: broadcast::Sender<DomainEvent>,
}

impl EventSender {
    /// Publish an event. Having no receivers is not an error.
    pub fn emit(&self, event: DomainEvent) {
        let event_type = event.type_name();
        let receivers = self.channel.send(event).unwrap_or(0);
        trace!(event_type, receivers, "[EventBus] Emitted");
    }
}

/// Consumer side
pub struct EventReceiver {
    channel: broadcast::Receiver<DomainEvent>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once every sender is gone.
    ///
    /// A receiver that fell behind skips the lost events and keeps going.
    pub async fn recv(&mut self) -> Option<DomainEvent> {
        loop {
            match self.channel.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "[EventBus] Receiver lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-buffered event, if any.
    pub fn try_recv(&mut self) -> Option<DomainEvent> {
        loop {
            match self.channel.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "[EventBus] Receiver lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
