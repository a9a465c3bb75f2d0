//! Fan-out channel for dashboard notifications.
//!
//! Every connected admin dashboard holds a receiver; a publish delivers the event to all of them, at most
//! once each. There is no persistence or replay: a subscriber that connects after a publish never sees that
//! event, and a subscriber that falls too far behind loses the oldest events it has not read. Publishing
//! never blocks and never fails the caller; mutations must already be durable by the time they are announced.

use log::*;
use tokio::sync::broadcast;

use super::DashboardEvent;

pub const DEFAULT_EVENT_CAPACITY: usize = 32;

#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<DashboardEvent>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBroadcaster {
    /// `capacity` bounds the per-subscriber backlog. A subscriber that lags further than this drops events
    /// rather than stalling publishers.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Registers a new subscriber. The receiver sees every event published from this moment on.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Delivers `event` to every currently-connected subscriber, fire-and-forget. A publish with no
    /// subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, event: DashboardEvent) {
        let topic = event.topic();
        match self.sender.send(event) {
            Ok(n) => trace!("📡️ Published {topic} to {n} subscriber(s)"),
            Err(_) => trace!("📡️ No subscribers connected; {topic} event dropped"),
        }
    }
}

#[cfg(test)]
mod test {
    use storefront_common::Cents;

    use super::*;
    use crate::api::stats::DashboardStats;

    fn stats_event(revenue: i64) -> DashboardEvent {
        DashboardEvent::StatsUpdate(DashboardStats {
            total_revenue: Cents::from(revenue),
            new_orders_count: 0,
            total_products: 0,
            recent_orders: vec![],
        })
    }

    #[tokio::test]
    async fn all_connected_subscribers_receive_the_event() {
        let broadcaster = EventBroadcaster::new(8);
        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();
        broadcaster.publish(stats_event(100));
        assert_eq!(rx1.recv().await.unwrap().topic(), "stats_update");
        assert_eq!(rx2.recv().await.unwrap().topic(), "stats_update");
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_not_an_error() {
        let broadcaster = EventBroadcaster::new(8);
        broadcaster.publish(stats_event(100));
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn late_subscribers_never_see_old_events() {
        let broadcaster = EventBroadcaster::new(8);
        broadcaster.publish(stats_event(100));
        let mut rx = broadcaster.subscribe();
        broadcaster.publish(stats_event(200));
        let ev = rx.recv().await.unwrap();
        match ev {
            DashboardEvent::StatsUpdate(stats) => assert_eq!(stats.total_revenue, Cents::from(200)),
            other => panic!("Unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }
}
