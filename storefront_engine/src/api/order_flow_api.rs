use std::fmt::Debug;

use log::*;

use crate::{
    api::{
        order_objects::{OrderChanged, OrderQueryFilter},
        stats,
        stats::DashboardStats,
    },
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    events::{
        DashboardEvent,
        EventBroadcaster,
        EventProducers,
        OrderCancelledPayload,
        OrderCreatedEvent,
        OrderStatusChangedEvent,
    },
    traits::{OrderApiError, OrderManagement, StorefrontDatabase},
    transitions::Initiator,
};

/// `OrderFlowApi` is the primary API for the order lifecycle: placing orders, changing their status, and
/// cancelling them. Every mutation runs as store-mutate → broadcast: the change is durable before anything
/// is announced, and a failed or subscriber-less broadcast never affects the caller-visible result.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
    broadcaster: EventBroadcaster,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers, broadcaster: EventBroadcaster) -> Self {
        Self { db, producers, broadcaster }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    pub async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderApiError> {
        self.db.fetch_orders(OrderQueryFilter::default()).await
    }

    pub async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, OrderApiError> {
        self.db.fetch_order_by_id(id).await
    }

    pub async fn fetch_orders_for_customer(&self, email: &str) -> Result<Vec<Order>, OrderApiError> {
        self.db.fetch_orders_for_email(email).await
    }
}

impl<B> OrderFlowApi<B>
where B: StorefrontDatabase
{
    /// Places a new order.
    ///
    /// The draft is validated (including the server-side total check), stored with a freshly seeded `Pending`
    /// history, and then announced: a `new_order` broadcast, a `stats_update` broadcast, and the
    /// order-created hook, in that order. Returns the stored order.
    pub async fn place_order(&self, draft: NewOrder) -> Result<Order, OrderApiError> {
        draft.validate()?;
        let order = self.db.insert_order(draft).await?;
        debug!("🛒️ Order {} placed by {} for {}", order.id, order.customer_email, order.total);
        self.broadcaster.publish(DashboardEvent::NewOrder(order.clone()));
        stats::broadcast_stats(&self.db, &self.broadcaster).await;
        self.call_order_created_hook(&order).await;
        Ok(order)
    }

    /// Changes the status of an order on behalf of the given initiator.
    ///
    /// The transition rules are checked against the currently-stored status inside the store's transaction,
    /// so concurrent changes to the same order serialize and the history never loses an event. On success an
    /// `order_updated` and a `stats_update` broadcast go out, plus an `order_cancelled` broadcast when the
    /// new status is `Cancelled`.
    pub async fn set_status(
        &self,
        id: &OrderId,
        new_status: OrderStatusType,
        notes: Option<String>,
        initiator: Initiator,
    ) -> Result<Order, OrderApiError> {
        let OrderChanged { order, old_status } = self.db.apply_status_change(id, new_status, notes, initiator).await?;
        info!("🛒️ Order {} moved from {old_status} to {}", order.id, order.status);
        self.broadcaster.publish(DashboardEvent::OrderUpdated(order.clone()));
        stats::broadcast_stats(&self.db, &self.broadcaster).await;
        if order.status == OrderStatusType::Cancelled {
            self.broadcaster.publish(DashboardEvent::OrderCancelled(OrderCancelledPayload::new(order.clone())));
        }
        self.call_status_changed_hook(&order, old_status).await;
        Ok(order)
    }

    /// Customer-initiated cancellation. Only `Pending` orders can be cancelled this way; anything further
    /// along fails with the customer-facing "already being processed" precondition error.
    pub async fn cancel_order(&self, id: &OrderId) -> Result<Order, OrderApiError> {
        self.set_status(id, OrderStatusType::Cancelled, Some("Cancelled by customer".to_string()), Initiator::Customer)
            .await
    }

    /// A fresh dashboard snapshot, straight from the store.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, OrderApiError> {
        stats::compute_dashboard_stats(&self.db).await
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            trace!("🛒️ Notifying order-created hook subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone())).await;
        }
    }

    async fn call_status_changed_hook(&self, order: &Order, old_status: OrderStatusType) {
        for emitter in &self.producers.status_changed_producer {
            trace!("🛒️ Notifying status-changed hook subscribers");
            emitter.publish_event(OrderStatusChangedEvent::new(order.clone(), old_status)).await;
        }
    }
}
