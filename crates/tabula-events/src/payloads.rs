//! Envelope and delivery types carried through the hub.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to each published event, starting at 1.
pub type EventId = u64;

/// Identifier handed out for each subscription.
pub type SubscriptionId = u64;

/// Default size of the in-memory replay ring.
pub const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// An event type that can be routed through an [`EventHub`](crate::EventHub).
pub trait Topic: Clone {
    /// Machine-friendly discriminator used for subscription filters.
    fn kind(&self) -> &'static str;
}

/// Metadata wrapper around an event. Tracks the event id and emission
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventEnvelope<E> {
    /// Sequential identifier assigned by the hub.
    pub id: EventId,
    /// Wall-clock time the event was published.
    pub timestamp: DateTime<Utc>,
    /// Event payload.
    pub event: E,
}

/// Verdict returned by intercepting handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Let the operation that published the event proceed.
    #[default]
    Continue,
    /// Ask the publisher to abandon the operation. Only meaningful for
    /// events the publisher documents as vetoable.
    Veto,
}

/// Summary of a single `publish` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Identifier assigned to the published event.
    pub id: EventId,
    /// Number of handlers that received the event.
    pub delivered: usize,
    /// Whether any handler returned [`Flow::Veto`].
    pub vetoed: bool,
}
