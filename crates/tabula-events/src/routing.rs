//! Synchronous event routing.

use crate::error::{EventHubError, EventHubResult};
use crate::payloads::{
    DEFAULT_REPLAY_CAPACITY, Delivery, EventEnvelope, EventId, Flow, SubscriptionId, Topic,
};
use crate::topics::KindFilter;
use chrono::Utc;
use std::collections::VecDeque;
use std::fmt;

type Handler<E> = Box<dyn FnMut(&EventEnvelope<E>) -> Flow>;

struct Subscription<E> {
    id: SubscriptionId,
    filter: KindFilter,
    handler: Handler<E>,
}

/// Event hub owned by a single publisher.
///
/// Handlers are plain closures and run on the publishing thread before
/// [`EventHub::publish`] returns. A handler never receives a reference to the
/// publisher, so it cannot call back into it while an event is in flight.
pub struct EventHub<E: Topic> {
    subscriptions: Vec<Subscription<E>>,
    replay: VecDeque<EventEnvelope<E>>,
    replay_capacity: usize,
    next_id: EventId,
    next_subscription: SubscriptionId,
}

impl<E: Topic> EventHub<E> {
    /// Construct a hub with a custom replay capacity. A capacity of zero
    /// disables replay.
    #[must_use]
    pub fn with_capacity(replay_capacity: usize) -> Self {
        Self {
            subscriptions: Vec::new(),
            replay: VecDeque::with_capacity(replay_capacity),
            replay_capacity,
            next_id: 1,
            next_subscription: 1,
        }
    }

    /// Construct a hub with the default replay capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Observe every event.
    pub fn subscribe<F>(&mut self, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&EventEnvelope<E>) + 'static,
    {
        self.intercept(KindFilter::All, move |envelope| {
            handler(envelope);
            Flow::Continue
        })
    }

    /// Observe only events of one kind.
    pub fn subscribe_to<F>(&mut self, kind: &'static str, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&EventEnvelope<E>) + 'static,
    {
        self.intercept(KindFilter::Only(kind), move |envelope| {
            handler(envelope);
            Flow::Continue
        })
    }

    /// Register a handler that may veto the publisher's operation.
    pub fn intercept<F>(&mut self, filter: KindFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&EventEnvelope<E>) -> Flow + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription = self.next_subscription.saturating_add(1);
        self.subscriptions.push(Subscription {
            id,
            filter,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`EventHubError::UnknownSubscription`] when no handler is
    /// registered under `id`.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> EventHubResult<()> {
        let position = self
            .subscriptions
            .iter()
            .position(|sub| sub.id == id)
            .ok_or(EventHubError::UnknownSubscription {
                subscription_id: id,
            })?;
        self.subscriptions.remove(position);
        Ok(())
    }

    /// Publish an event to every matching handler.
    pub fn publish(&mut self, event: E) -> Delivery {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);

        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        let mut delivered = 0;
        let mut vetoed = false;
        for sub in &mut self.subscriptions {
            if !sub.filter.matches(&envelope.event) {
                continue;
            }
            delivered += 1;
            if (sub.handler)(&envelope) == Flow::Veto {
                vetoed = true;
            }
        }

        if self.replay_capacity > 0 {
            if self.replay.len() == self.replay_capacity {
                let _ = self.replay.pop_front();
            }
            self.replay.push_back(envelope);
        }

        Delivery {
            id,
            delivered,
            vetoed,
        }
    }

    /// Last event id held in the replay buffer.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.replay.back().map(|env| env.id)
    }

    /// Collect buffered events emitted after the specified id.
    #[must_use]
    pub fn backlog_since(&self, id: EventId) -> Vec<EventEnvelope<E>> {
        self.replay.iter().filter(|env| env.id > id).cloned().collect()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl<E: Topic> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Topic> fmt::Debug for EventHub<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("subscriptions", &self.subscriptions.len())
            .field("replay_len", &self.replay.len())
            .field("replay_capacity", &self.replay_capacity)
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Signal {
        Opened(u32),
        Closed,
    }

    impl Topic for Signal {
        fn kind(&self) -> &'static str {
            match self {
                Self::Opened(_) => "opened",
                Self::Closed => "closed",
            }
        }
    }

    #[test]
    fn publish_and_replay_from_id() {
        let mut hub = EventHub::with_capacity(4);
        let first = hub.publish(Signal::Opened(1)).id;
        let second = hub.publish(Signal::Closed).id;

        assert_eq!(hub.last_event_id(), Some(second));
        let backlog = hub.backlog_since(first);
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].id, second);
        assert_eq!(backlog[0].event, Signal::Closed);
    }

    #[test]
    fn replay_ring_drops_oldest() {
        let mut hub = EventHub::with_capacity(2);
        for seq in 0..5 {
            let _ = hub.publish(Signal::Opened(seq));
        }
        let backlog = hub.backlog_since(0);
        assert_eq!(backlog.len(), 2);
        assert_eq!(backlog[0].id, 4);
        assert_eq!(backlog[1].id, 5);
    }

    #[test]
    fn zero_capacity_disables_replay() {
        let mut hub = EventHub::with_capacity(0);
        let delivery = hub.publish(Signal::Closed);
        assert_eq!(delivery.id, 1);
        assert_eq!(hub.last_event_id(), None);
    }

    #[test]
    fn handlers_run_in_subscription_order_with_filters() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut hub = EventHub::new();

        let all = Rc::clone(&seen);
        let _ = hub.subscribe(move |env: &EventEnvelope<Signal>| {
            all.borrow_mut().push(format!("all:{}", env.event.kind()));
        });
        let closed = Rc::clone(&seen);
        let _ = hub.subscribe_to("closed", move |env| {
            closed.borrow_mut().push(format!("closed:{}", env.id));
        });

        let first = hub.publish(Signal::Opened(1));
        let second = hub.publish(Signal::Closed);

        assert_eq!(first.delivered, 1);
        assert_eq!(second.delivered, 2);
        assert_eq!(
            *seen.borrow(),
            vec!["all:opened", "all:closed", "closed:2"]
        );
    }

    #[test]
    fn intercepting_handler_reports_veto() {
        let mut hub = EventHub::new();
        let _ = hub.intercept(KindFilter::Only("opened"), |env: &EventEnvelope<Signal>| {
            if env.event == Signal::Opened(13) {
                Flow::Veto
            } else {
                Flow::Continue
            }
        });

        assert!(!hub.publish(Signal::Opened(1)).vetoed);
        assert!(hub.publish(Signal::Opened(13)).vetoed);
        assert!(!hub.publish(Signal::Closed).vetoed);
    }

    #[test]
    fn unsubscribe_removes_handler() {
        let count = Rc::new(RefCell::new(0_u32));
        let mut hub = EventHub::new();
        let counter = Rc::clone(&count);
        let id = hub.subscribe(move |_: &EventEnvelope<Signal>| *counter.borrow_mut() += 1);

        let _ = hub.publish(Signal::Closed);
        hub.unsubscribe(id).expect("subscription exists");
        let _ = hub.publish(Signal::Closed);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(
            hub.unsubscribe(id),
            Err(EventHubError::UnknownSubscription {
                subscription_id: id
            })
        );
    }
}
