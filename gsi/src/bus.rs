//! In-process publish/subscribe for derived events.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use common::{Event, EventKind};

pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    once: bool,
    handler: Handler,
}

/// Delivers every emitted event to the handlers subscribed to its kind, in
/// subscription order.
///
/// Handlers run on the emitting thread without any internal lock held, so a
/// handler may subscribe or unsubscribe itself.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: Mutex<BTreeMap<EventKind, Vec<Subscriber>>>,
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        let counts: BTreeMap<_, _> = subscribers.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("EventBus").field("subscribers", &counts).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.insert(kind, false, Arc::new(handler))
    }

    /// Like [`EventBus::subscribe`], but the handler is removed after its
    /// first delivery.
    pub fn subscribe_once<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.insert(kind, true, Arc::new(handler))
    }

    fn insert(&self, kind: EventKind, once: bool, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.entry(kind).or_default().push(Subscriber { id, once, handler });

        tracing::trace!(%kind, ?id, "Subscribed");
        id
    }

    /// Returns `false` if no such subscription exists (anymore).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());

        for handlers in subscribers.values_mut() {
            if let Some(idx) = handlers.iter().position(|s| s.id == id) {
                handlers.remove(idx);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.get(&kind).map(|s| s.len()).unwrap_or(0)
    }

    pub fn emit(&self, event: &Event) {
        let kind = event.kind();

        let handlers: Vec<Handler> = {
            let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
            let Some(entries) = subscribers.get_mut(&kind) else {
                return;
            };

            let handlers = entries.iter().map(|s| s.handler.clone()).collect();
            entries.retain(|s| !s.once);
            handlers
        };

        for handler in handlers {
            handler(event);
        }
    }

    pub fn publish<'e, I>(&self, events: I)
    where
        I: IntoIterator<Item = &'e Event>,
    {
        for event in events {
            self.emit(event);
        }
    }
}
