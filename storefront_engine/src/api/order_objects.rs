use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// Criteria for fetching orders. Defaults to every order, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub customer_email: Option<String>,
    pub statuses: Vec<OrderStatusType>,
    pub newest_first: bool,
    pub limit: Option<i64>,
}

impl Default for OrderQueryFilter {
    fn default() -> Self {
        Self { customer_email: None, statuses: Vec::new(), newest_first: true, limit: None }
    }
}

impl OrderQueryFilter {
    pub fn with_customer_email<S: Into<String>>(mut self, email: S) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// True when no WHERE clause is needed.
    pub fn is_unfiltered(&self) -> bool {
        self.customer_email.is_none() && self.statuses.is_empty()
    }
}

/// Result of a status change: the updated order, plus the status it had before the change (handlers and
/// hooks often branch on where the order came from).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderChanged {
    pub order: Order,
    pub old_status: OrderStatusType,
}

impl OrderChanged {
    pub fn new(order: Order, old_status: OrderStatusType) -> Self {
        Self { order, old_status }
    }
}
