//! Dashboard aggregates.
//!
//! [`DashboardStats`] is never persisted: it is a pure function of the order store and product catalog at the
//! moment of computation, recomputed fresh on every call. At storefront scale a full recompute per request is
//! fine; a high-volume system would maintain these incrementally.

use log::warn;
use serde::{Deserialize, Serialize};
use storefront_common::Cents;

use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::Order,
    events::{DashboardEvent, EventBroadcaster},
    traits::{OrderApiError, OrderManagement, ProductCatalog},
};

/// How many orders the dashboard shows in its "recent orders" panel.
pub const RECENT_ORDER_COUNT: i64 = 5;

/// Store-side order aggregates: revenue over non-cancelled orders and the pending-order count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderTotals {
    pub total_revenue: Cents,
    pub pending_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue: Cents,
    pub new_orders_count: i64,
    pub total_products: i64,
    pub recent_orders: Vec<Order>,
}

impl DashboardStats {
    pub fn assemble(totals: OrderTotals, total_products: i64, recent_orders: Vec<Order>) -> Self {
        Self {
            total_revenue: totals.total_revenue,
            new_orders_count: totals.pending_count,
            total_products,
            recent_orders,
        }
    }
}

/// Computes a fresh stats snapshot from the current store contents.
pub async fn compute_dashboard_stats<B>(db: &B) -> Result<DashboardStats, OrderApiError>
where B: OrderManagement + ProductCatalog {
    let totals = db.order_totals().await?;
    let total_products = db.product_count().await.map_err(|e| OrderApiError::DatabaseError(e.to_string()))?;
    let recent = db.fetch_orders(OrderQueryFilter::default().with_limit(RECENT_ORDER_COUNT)).await?;
    Ok(DashboardStats::assemble(totals, total_products, recent))
}

/// Recomputes the stats and fans them out to the dashboards. Best-effort: the triggering mutation has
/// already committed, so a failure here is logged and swallowed rather than surfaced to the caller.
pub async fn broadcast_stats<B>(db: &B, broadcaster: &EventBroadcaster)
where B: OrderManagement + ProductCatalog {
    match compute_dashboard_stats(db).await {
        Ok(stats) => broadcaster.publish(DashboardEvent::StatsUpdate(stats)),
        Err(e) => warn!("📊️ Could not recompute dashboard stats for broadcast. {e}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn assemble_maps_pending_count_to_new_orders() {
        let totals = OrderTotals { total_revenue: Cents::from(12345), pending_count: 3 };
        let stats = DashboardStats::assemble(totals, 7, vec![]);
        assert_eq!(stats.total_revenue, Cents::from(12345));
        assert_eq!(stats.new_orders_count, 3);
        assert_eq!(stats.total_products, 7);
        assert!(stats.recent_orders.is_empty());
    }

    #[test]
    fn stats_serialize_with_camel_case_keys() {
        let stats = DashboardStats::assemble(OrderTotals::default(), 0, vec![]);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("totalRevenue").is_some());
        assert!(json.get("newOrdersCount").is_some());
        assert!(json.get("totalProducts").is_some());
        assert!(json.get("recentOrders").is_some());
    }
}
