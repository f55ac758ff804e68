use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{DashEvent, EventKind};

/// Handle returned by `EventBus::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&DashEvent)>;

struct Subscriber {
    id: SubscriptionId,
    handler: Handler,
}

/// Synchronous publish/subscribe hub keyed by event kind.
///
/// Handlers for one kind run in subscription order on the publishing call
/// stack. Nothing is buffered: an event published while no handler is
/// subscribed to its kind is dropped.
#[derive(Default)]
pub struct EventBus {
    handlers: IndexMap<EventKind, Vec<Subscriber>>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&DashEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(kind).or_default().push(Subscriber {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a subscription. Returns `true` when it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for subscribers in self.handlers.values_mut() {
            if let Some(position) = subscribers.iter().position(|entry| entry.id == id) {
                subscribers.remove(position);
                return true;
            }
        }
        false
    }

    /// Delivers `event` to every handler of its kind and returns how many ran.
    pub fn publish(&mut self, event: &DashEvent) -> usize {
        let kind = event.kind();
        let Some(subscribers) = self.handlers.get_mut(&kind) else {
            trace!(?kind, "no subscribers, event dropped");
            return 0;
        };
        for subscriber in subscribers.iter_mut() {
            (subscriber.handler)(event);
        }
        if subscribers.is_empty() {
            trace!(?kind, "no subscribers, event dropped");
        }
        subscribers.len()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn subscribers_for(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}
