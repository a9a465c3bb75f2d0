//! Operational event handlers installed at startup.
//!
//! These run outside the request path: the order flow pushes events into the hook channels after the
//! mutation commits, and the handlers do their work (currently audit logging and refund flagging) on their
//! own time. A slow handler delays nothing but itself.

use log::*;
use storefront_engine::{
    db_types::{OrderStatusType, PaymentMethod},
    events::{EventHandlers, EventHooks, OrderStatusChangedEvent},
};

pub const OPS_EVENT_BUFFER_SIZE: usize = 25;

pub fn create_ops_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    // --- On OrderCreated handler ---
    hooks.on_order_created(|ev| {
        let order = ev.order;
        Box::pin(async move {
            info!(
                "🧾️ New order {} from {} <{}> for {} ({} item(s), {})",
                order.id,
                order.customer_name,
                order.customer_email,
                order.total,
                order.items.len(),
                order.payment_method
            );
        })
    });
    // --- On StatusChanged handler ---
    hooks.on_status_changed(|ev| {
        let OrderStatusChangedEvent { order, old_status } = ev;
        Box::pin(async move {
            info!("🧾️ Order {} moved from {old_status} to {}", order.id, order.status);
            if order.status == OrderStatusType::Cancelled && order.payment_method == PaymentMethod::Card {
                warn!(
                    "🧾️ Order {} was paid by card and has been cancelled. A refund of {} may be required.",
                    order.id, order.total
                );
            }
        })
    });
    EventHandlers::new(OPS_EVENT_BUFFER_SIZE, hooks)
}
