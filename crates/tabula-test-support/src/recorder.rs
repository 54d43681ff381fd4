//! Event capture for assertions.

use std::cell::RefCell;
use std::rc::Rc;

use tabula_events::{SubscriptionId, Topic};
use tabula_store::{RecordStore, StoreEvent};

/// Collects every event a store publishes after [`EventRecorder::attach`].
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<StoreEvent>>>,
}

impl EventRecorder {
    /// Subscribe a new recorder to `store`.
    pub fn attach(store: &mut RecordStore) -> (Self, SubscriptionId) {
        let recorder = Self::default();
        let sink = Rc::clone(&recorder.events);
        let id = store.subscribe(move |envelope| sink.borrow_mut().push(envelope.event.clone()));
        (recorder, id)
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.borrow().clone()
    }

    /// Kinds of the events recorded so far.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(Topic::kind).collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::people_store;
    use anyhow::Result;
    use tabula_store::LoadPayload;

    #[test]
    fn records_kinds_in_order() -> Result<()> {
        let mut store = people_store(|options| options)?;
        let (recorder, _) = EventRecorder::attach(&mut store);
        let _ = store.load(LoadPayload::text(r#"[{"last":"A"}]"#));
        let _ = store.next()?;
        assert_eq!(recorder.kinds(), vec!["preload", "load_finished", "store_move"]);
        recorder.clear();
        assert!(recorder.events().is_empty());
        Ok(())
    }
}
