/// Board event fan-out
///
/// The soundboard publishes unit and project events; the console loop and
/// tests subscribe. A subscriber whose receiver was dropped is pruned on the
/// next publish.
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};

use super::events::Event;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    sender: Sender<Event>,
}

/// Cloneable handle; clones share one subscriber list
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<Mutex<usize>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(Mutex::new(0)),
        }
    }

    /// Start receiving every board event published from now on
    pub fn subscribe(&self) -> (Receiver<Event>, SubscriberId) {
        let (sender, receiver) = unbounded();
        let id = {
            let mut next_id = self.next_id.lock();
            *next_id += 1;
            SubscriberId(*next_id)
        };
        self.subscribers.write().push(Subscriber { id, sender });
        (receiver, id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Deliver `event` to every live subscriber
    pub fn publish(&self, event: Event) {
        tracing::trace!("Board event: {}", event.description());

        let mut closed = Vec::new();
        for subscriber in self.subscribers.read().iter() {
            if let Err(TrySendError::Disconnected(_)) = subscriber.sender.try_send(event.clone()) {
                closed.push(subscriber.id);
            }
        }

        if !closed.is_empty() {
            tracing::debug!("Dropping {} closed subscriber(s)", closed.len());
            self.subscribers.write().retain(|s| !closed.contains(&s.id));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let (rx, id) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.unsubscribe(id);
        bus.publish(Event::ProjectCleared);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_every_subscriber_sees_board_events() {
        let bus = EventBus::new();
        let (console, _) = bus.subscribe();
        let (log, _) = bus.subscribe();

        bus.publish(Event::ProjectCleared);
        bus.publish(Event::Shutdown);

        for rx in [console, log] {
            let seen: Vec<_> = rx.try_iter().collect();
            assert_eq!(seen, [Event::ProjectCleared, Event::Shutdown]);
        }
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let bus = EventBus::new();
        let (rx, _id) = bus.subscribe();
        let (_kept, _id2) = bus.subscribe();
        drop(rx);

        bus.publish(Event::Shutdown);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_board_and_console_share_one_bus() {
        let board_side = EventBus::new();
        let console_side = board_side.clone();

        let (rx, _id) = console_side.subscribe();
        board_side.publish(Event::ProjectCleared);
        assert_eq!(rx.try_recv().unwrap(), Event::ProjectCleared);
    }
}
