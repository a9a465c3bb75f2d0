//! `SqliteDatabase` is the concrete storage backend for the storefront.
//!
//! Unsurprisingly, it uses SQLite, and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{customers, db_url, new_pool, orders, products};
use crate::{
    api::{
        order_objects::{OrderChanged, OrderQueryFilter},
        stats::OrderTotals,
    },
    db_types::{
        Customer,
        CustomerSummary,
        NewCustomer,
        NewOrder,
        NewProduct,
        Order,
        OrderId,
        OrderStatusType,
        Product,
        ProductUpdate,
        StatusEvent,
    },
    traits::{CatalogApiError, CustomerApiError, CustomerDirectory, OrderApiError, OrderManagement, ProductCatalog},
    transitions::{validate_transition, Initiator},
};

/// How often a status change retries when another writer keeps winning the race on the same order. In
/// practice one retry is already rare; exhausting all attempts means something is hammering a single order.
const MAX_STATUS_CHANGE_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderApiError> {
        order.validate()?;
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB", order.id);
        Ok(order)
    }

    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(id, &mut conn).await
    }

    async fn fetch_orders_for_email(&self, email: &str) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let query = OrderQueryFilter::default().with_customer_email(email);
        orders::fetch_orders(query, &mut conn).await
    }

    async fn fetch_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders(query, &mut conn).await
    }

    /// Optimistic check-and-append. The transition is validated against the status we read; the write then
    /// only lands if the stored status is still that value. If a concurrent writer got in between, we
    /// re-read and re-validate rather than appending against a stale state.
    async fn apply_status_change(
        &self,
        id: &OrderId,
        new_status: OrderStatusType,
        notes: Option<String>,
        initiator: Initiator,
    ) -> Result<OrderChanged, OrderApiError> {
        for attempt in 1..=MAX_STATUS_CHANGE_ATTEMPTS {
            let mut conn = self.pool.acquire().await?;
            let current = match orders::fetch_status(id, &mut conn).await? {
                Some(status) => status,
                None => return Err(OrderApiError::OrderNotFound(id.clone())),
            };
            drop(conn);
            validate_transition(current, new_status, initiator)?;
            let event = StatusEvent::now(new_status, notes.clone());
            let mut tx = self.pool.begin().await?;
            if !orders::try_update_status(id, current, &event, &mut tx).await? {
                tx.rollback().await?;
                debug!("🗃️ Order {id} changed status under us (attempt {attempt}). Re-validating.");
                continue;
            }
            let order = orders::fetch_order(id, &mut tx)
                .await?
                .ok_or_else(|| OrderApiError::OrderNotFound(id.clone()))?;
            tx.commit().await?;
            debug!("🗃️ Order {id} is now {} ({} history entries)", order.status, order.status_history.len());
            return Ok(OrderChanged::new(order, current));
        }
        error!("🗃️ Gave up updating order {id} after {MAX_STATUS_CHANGE_ATTEMPTS} attempts");
        Err(OrderApiError::DatabaseError(format!("Too much contention while updating order {id}")))
    }

    async fn order_totals(&self) -> Result<OrderTotals, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::order_totals(&mut conn).await
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_product(product, &mut conn).await
    }

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_product(id, &mut conn).await
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_products(&mut conn).await
    }

    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let product = products::update_product(id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn delete_product(&self, id: i64) -> Result<bool, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::delete_product(id, &mut conn).await
    }

    async fn product_count(&self) -> Result<i64, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::product_count(&mut conn).await
    }
}

impl CustomerDirectory for SqliteDatabase {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        customers::insert_customer(customer, &mut conn).await
    }

    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        customers::fetch_customer_by_email(email, &mut conn).await
    }

    async fn customer_summaries(&self) -> Result<Vec<CustomerSummary>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        customers::customer_summaries(&mut conn).await
    }
}
