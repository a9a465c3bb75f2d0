use crate::{
    api::{
        order_objects::{OrderChanged, OrderQueryFilter},
        stats::OrderTotals,
    },
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    traits::OrderApiError,
    transitions::Initiator,
};

/// The order store contract.
///
/// Implementations own the persisted order collection: creation, look-up, and the atomic status-history
/// append. Status mutations on a single order must be serialized by the backend; mutations on different
/// orders are independent.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order atomically: assigns an id, the creation timestamp and a transaction id, and seeds
    /// the status history with a single `Pending` entry. The caller is expected to have validated the draft;
    /// implementations validate again because the store is the last line of defence.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderApiError>;

    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderApiError>;

    /// All orders placed with the given email, matched case-insensitively, newest first.
    async fn fetch_orders_for_email(&self, email: &str) -> Result<Vec<Order>, OrderApiError>;

    /// Fetches orders according to criteria specified in the `OrderQueryFilter`.
    async fn fetch_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderApiError>;

    /// Atomically applies a status change: checks the transition rules against the *current* stored status,
    /// sets the new status and appends exactly one history entry, all in one transaction. Two concurrent
    /// calls against the same order serialize; neither event is lost.
    ///
    /// Returns the updated order together with the status it had before the change.
    async fn apply_status_change(
        &self,
        id: &OrderId,
        new_status: OrderStatusType,
        notes: Option<String>,
        initiator: Initiator,
    ) -> Result<OrderChanged, OrderApiError>;

    /// Revenue (excluding cancelled orders) and the number of pending orders, aggregated store-side.
    async fn order_totals(&self) -> Result<OrderTotals, OrderApiError>;
}
