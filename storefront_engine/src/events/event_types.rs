use serde::{Deserialize, Serialize};

use crate::{
    api::stats::DashboardStats,
    db_types::{Order, OrderStatusType},
};

/// The note attached to every `order_cancelled` broadcast, so operators know to check the payment.
pub const REFUND_NOTICE: &str = "Refund may be required.";

/// Payload for the `order_cancelled` topic: the full order plus an operator-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelledPayload {
    #[serde(flatten)]
    pub order: Order,
    pub message: String,
}

impl OrderCancelledPayload {
    pub fn new(order: Order) -> Self {
        Self { order, message: REFUND_NOTICE.to_string() }
    }
}

/// Events fanned out to every connected dashboard subscriber.
///
/// Serialization is untagged: the wire payload is the inner value alone, and the topic travels separately
/// (as the SSE `event:` field) via [`DashboardEvent::topic`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DashboardEvent {
    NewOrder(Order),
    OrderUpdated(Order),
    OrderCancelled(OrderCancelledPayload),
    StatsUpdate(DashboardStats),
}

impl DashboardEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            DashboardEvent::NewOrder(_) => "new_order",
            DashboardEvent::OrderUpdated(_) => "order_updated",
            DashboardEvent::OrderCancelled(_) => "order_cancelled",
            DashboardEvent::StatsUpdate(_) => "stats_update",
        }
    }
}

//--------------------------------------     Hook events       --------------------------------------------------------
// Events delivered to the async hook handlers registered at startup. These carry more context than the
// dashboard broadcasts (e.g. the previous status) since handlers often branch on it.

#[derive(Debug, Clone)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

#[derive(Debug, Clone)]
pub struct OrderStatusChangedEvent {
    pub order: Order,
    pub old_status: OrderStatusType,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, old_status: OrderStatusType) -> Self {
        Self { order, old_status }
    }
}
