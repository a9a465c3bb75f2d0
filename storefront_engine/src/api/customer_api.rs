use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Customer, CustomerSummary, NewCustomer},
    traits::{CustomerApiError, CustomerDirectory},
};

/// Customer directory management: registration and the per-customer spending summary.
pub struct CustomerApi<B> {
    db: B,
}

impl<B> Debug for CustomerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CustomerApi")
    }
}

impl<B> CustomerApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CustomerApi<B>
where B: CustomerDirectory
{
    /// Registers a new customer. Emails are unique, case-insensitively; the database enforces this with a
    /// unique index, so the pre-check here only exists to produce the friendlier error.
    pub async fn register_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError> {
        if customer.name.trim().is_empty() {
            return Err(CustomerApiError::MissingField("name"));
        }
        if customer.email.trim().is_empty() {
            return Err(CustomerApiError::MissingField("email"));
        }
        if self.db.fetch_customer_by_email(&customer.email).await?.is_some() {
            return Err(CustomerApiError::DuplicateEmail(customer.email));
        }
        let customer = self.db.insert_customer(customer).await?;
        info!("👤️ Registered customer {} <{}>", customer.name, customer.email);
        Ok(customer)
    }

    pub async fn customer_summaries(&self) -> Result<Vec<CustomerSummary>, CustomerApiError> {
        self.db.customer_summaries().await
    }
}
