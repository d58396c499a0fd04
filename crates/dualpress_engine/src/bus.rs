//! In-process notification bus backed by a `tokio::sync::broadcast` channel.

use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out of state-change notifications to any number of subscribers.
///
/// Every subscriber sees events in publish order. A subscriber that falls
/// more than the capacity behind observes `RecvError::Lagged`.
pub struct NotificationBus<T> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> NotificationBus<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes to all current subscribers; dropped when there are none.
    pub fn publish(&self, event: T) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone> Default for NotificationBus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let bus = NotificationBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        for i in 0..3 {
            bus.publish(i);
        }

        for rx in [&mut first, &mut second] {
            assert_eq!(rx.recv().await.unwrap(), 0);
            assert_eq!(rx.recv().await.unwrap(), 1);
            assert_eq!(rx.recv().await.unwrap(), 2);
        }
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus: NotificationBus<&str> = NotificationBus::new(4);
        bus.publish("orphan");
    }
}
