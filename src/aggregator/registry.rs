use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::{Alert, Token, Trade, TrackedWallet};

/// Topics a dashboard view can subscribe to. Every publish carries the full
/// current sequence for its topic, never a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Alerts,
    Tokens,
    Trades,
    TrackedWallets,
    TopWallets,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Alerts,
        Topic::Tokens,
        Topic::Trades,
        Topic::TrackedWallets,
        Topic::TopWallets,
    ];
}

/// One strongly-typed payload per topic.
#[derive(Debug, Clone)]
pub enum TopicPayload {
    Alerts(Vec<Alert>),
    Tokens(Vec<Token>),
    Trades(Vec<Trade>),
    TrackedWallets(Vec<TrackedWallet>),
    TopWallets(Vec<String>),
}

impl TopicPayload {
    pub fn topic(&self) -> Topic {
        match self {
            TopicPayload::Alerts(_) => Topic::Alerts,
            TopicPayload::Tokens(_) => Topic::Tokens,
            TopicPayload::Trades(_) => Topic::Trades,
            TopicPayload::TrackedWallets(_) => Topic::TrackedWallets,
            TopicPayload::TopWallets(_) => Topic::TopWallets,
        }
    }
}

pub type Handler = dyn Fn(&TopicPayload) -> anyhow::Result<()> + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: u64,
    handler: Arc<Handler>,
}

/// Per-topic pub/sub. Handlers run in registration order for a topic; a
/// failing handler is logged and never stops delivery to the handlers after
/// it. No ordering guarantee exists across topics.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<HashMap<Topic, Vec<Subscriber>>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&TopicPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.entry(topic).or_default().push(Subscriber {
            id,
            handler: Arc::new(handler),
        });
        SubscriptionId(id)
    }

    /// Returns false if the subscription was not registered for that topic.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap();
        match subscribers.get_mut(&topic) {
            Some(list) => {
                let before = list.len();
                list.retain(|s| s.id != id.0);
                list.len() != before
            }
            None => false,
        }
    }

    pub fn publish(&self, payload: TopicPayload) {
        let topic = payload.topic();

        // Snapshot the handler list before iterating so a handler may
        // re-enter the registry (subscribe, publish) without deadlocking.
        let handlers: Vec<Arc<Handler>> = {
            let subscribers = self.subscribers.lock().unwrap();
            match subscribers.get(&topic) {
                Some(list) => list.iter().map(|s| Arc::clone(&s.handler)).collect(),
                None => return,
            }
        };

        for handler in handlers {
            if let Err(e) = handler(&payload) {
                tracing::warn!(error = %e, topic = ?topic, "Subscriber handler failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn handlers_run_in_registration_order() {
        let registry = SubscriberRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            registry.subscribe(Topic::TopWallets, move |_| {
                seen.lock().unwrap().push(label);
                Ok(())
            });
        }

        registry.publish(TopicPayload::TopWallets(vec![]));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn failing_handler_does_not_stop_later_handlers() {
        let registry = SubscriberRegistry::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        registry.subscribe(Topic::Alerts, |_| anyhow::bail!("handler exploded"));
        let counter = Arc::clone(&delivered);
        registry.subscribe(Topic::Alerts, move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });

        registry.publish(TopicPayload::Alerts(vec![]));
        assert_eq!(delivered.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unsubscribe_removes_only_the_given_handler() {
        let registry = SubscriberRegistry::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&delivered);
        let first = registry.subscribe(Topic::Tokens, move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        let counter = Arc::clone(&delivered);
        registry.subscribe(Topic::Tokens, move |_| {
            counter.fetch_add(10, Ordering::Relaxed);
            Ok(())
        });

        assert!(registry.unsubscribe(Topic::Tokens, first));
        assert!(!registry.unsubscribe(Topic::Tokens, first));

        registry.publish(TopicPayload::Tokens(vec![]));
        assert_eq!(delivered.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn reentrant_subscribe_from_handler_does_not_deadlock() {
        let registry = Arc::new(SubscriberRegistry::new());
        let inner = Arc::clone(&registry);

        registry.subscribe(Topic::Trades, move |_| {
            inner.subscribe(Topic::Trades, |_| Ok(()));
            Ok(())
        });

        registry.publish(TopicPayload::Trades(vec![]));
    }
}
