use crate::{
    db_types::{Customer, CustomerSummary, NewCustomer},
    traits::CustomerApiError,
};

/// The customer directory contract. Orders stamp a name/email snapshot at creation; the directory exists so
/// that registration is possible and so the per-customer spending summary has identities to join against.
#[allow(async_fn_in_trait)]
pub trait CustomerDirectory {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError>;

    /// Case-insensitive email look-up.
    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerApiError>;

    /// Per-customer spend and last-order instant over non-cancelled orders, most recent purchaser first.
    /// Customers with no orders (and orders from unregistered emails) are not included.
    async fn customer_summaries(&self) -> Result<Vec<CustomerSummary>, CustomerApiError>;
}
