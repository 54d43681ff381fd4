//! Kind-based subscription filtering.

use crate::payloads::Topic;

/// Machine-friendly discriminator for an event.
#[must_use]
pub fn event_kind<E: Topic>(event: &E) -> &'static str {
    event.kind()
}

/// Which events a subscription receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    /// Every event published on the hub.
    #[default]
    All,
    /// Only events whose kind matches exactly.
    Only(&'static str),
}

impl KindFilter {
    /// Whether an event passes the filter.
    #[must_use]
    pub fn matches<E: Topic>(self, event: &E) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => event_kind(event) == kind,
        }
    }
}
