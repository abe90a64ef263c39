//! Explicit observer registration for scheduler events.
//!
//! Listeners are invoked synchronously on the publishing thread, after the
//! category lock has been released, so a listener may call back into the
//! scheduler.

use crate::model::category::Category;
use crate::schedule::runner::PromptKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Observable scheduler activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulerEvent {
    Armed {
        category: Category,
        delay_minutes: u32,
        kind: PromptKind,
        generation: u64,
    },
    ArmFailed {
        category: Category,
        reason: String,
    },
    Cancelled {
        category: Category,
    },
    Fired {
        category: Category,
    },
    Acknowledged {
        category: Category,
    },
    Snoozed {
        category: Category,
    },
    /// The acknowledgement log for `category` changed; counters are stale.
    LogChanged {
        category: Category,
    },
}

type Listener = Arc<dyn Fn(&SchedulerEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

/// Listener registry owned by one scheduler instance.
#[derive(Default)]
pub struct EventHub {
    registry: Arc<Mutex<Registry>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` until the returned handle is dropped.
    pub fn subscribe(
        &self,
        listener: impl Fn(&SchedulerEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, Arc::new(listener));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers `event` to every current listener in registration order.
    pub fn publish(&self, event: &SchedulerEvent) {
        let listeners: Vec<Listener> = self.lock().listeners.values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unsubscribe handle returned by [`EventHub::subscribe`].
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EventHub, SchedulerEvent};
    use crate::model::category::Category;
    use crate::schedule::runner::PromptKind;
    use std::sync::{Arc, Mutex};

    #[test]
    fn subscribers_receive_events_until_unsubscribed() {
        let hub = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = hub.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let event = SchedulerEvent::Fired {
            category: Category::Water,
        };
        hub.publish(&event);
        assert_eq!(hub.listener_count(), 1);

        subscription.unsubscribe();
        hub.publish(&event);

        assert_eq!(hub.listener_count(), 0);
        assert_eq!(seen.lock().unwrap().as_slice(), &[event]);
    }

    #[test]
    fn events_serialize_with_snake_case_tags() {
        let event = SchedulerEvent::Armed {
            category: Category::Bathroom,
            delay_minutes: 5,
            kind: PromptKind::Snoozed,
            generation: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "armed",
                "category": "bathroom",
                "delay_minutes": 5,
                "kind": "snoozed",
                "generation": 3
            })
        );

        let decoded: SchedulerEvent =
            serde_json::from_str(r#"{"event":"log_changed","category":"water"}"#).unwrap();
        assert_eq!(
            decoded,
            SchedulerEvent::LogChanged {
                category: Category::Water
            }
        );
    }

    #[test]
    fn subscription_outliving_hub_drops_cleanly() {
        let hub = EventHub::new();
        let subscription = hub.subscribe(|_| {});
        drop(hub);
        drop(subscription);
    }
}
