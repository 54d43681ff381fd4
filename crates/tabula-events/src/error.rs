//! Event hub error primitives.

use crate::payloads::SubscriptionId;
use std::fmt::{self, Display, Formatter};

/// Error emitted by hub bookkeeping operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHubError {
    /// No subscription is registered under the identifier.
    UnknownSubscription {
        /// Identifier supplied by the caller.
        subscription_id: SubscriptionId,
    },
}

impl EventHubError {
    /// Subscription identifier tied to the failure.
    #[must_use]
    pub const fn subscription_id(&self) -> SubscriptionId {
        match self {
            Self::UnknownSubscription { subscription_id } => *subscription_id,
        }
    }
}

impl Display for EventHubError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("unknown event subscription")
    }
}

impl std::error::Error for EventHubError {}

/// Result wrapper for event hub operations.
pub type EventHubResult<T> = Result<T, EventHubError>;
