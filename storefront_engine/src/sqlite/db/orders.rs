use chrono::{DateTime, Utc};
use log::trace;
use sqlx::{FromRow, QueryBuilder, SqliteConnection};
use storefront_common::Cents;

use crate::{
    api::{order_objects::OrderQueryFilter, stats::OrderTotals},
    db_types::{
        generate_transaction_id,
        GeoLocation,
        NewOrder,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        PaymentMethod,
        ShippingAddress,
        StatusEvent,
    },
    traits::OrderApiError,
};

#[derive(Debug, Clone, FromRow)]
struct OrderRow {
    order_id: String,
    customer_name: String,
    customer_email: String,
    order_timestamp: DateTime<Utc>,
    total_cents: i64,
    payment_method: String,
    transaction_id: String,
    status: String,
    full_name: String,
    street: String,
    city: String,
    state: String,
    zip: String,
    country: String,
    phone: String,
    lat: Option<f64>,
    lng: Option<f64>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>, status_history: Vec<StatusEvent>) -> Order {
        let location = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoLocation { lat, lng }),
            _ => None,
        };
        Order {
            id: OrderId(self.order_id),
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            order_timestamp: self.order_timestamp,
            items,
            total: Cents::from(self.total_cents),
            payment_method: PaymentMethod::from(self.payment_method),
            transaction_id: self.transaction_id,
            address: ShippingAddress {
                full_name: self.full_name,
                street: self.street,
                city: self.city,
                state: self.state,
                zip: self.zip,
                country: self.country,
                phone: self.phone,
                location,
            },
            status: OrderStatusType::from(self.status),
            status_history,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct ItemRow {
    product_id: String,
    product_name: String,
    quantity: i64,
    price_cents: i64,
}

#[derive(Debug, Clone, FromRow)]
struct StatusEventRow {
    status: String,
    timestamp: DateTime<Utc>,
    notes: Option<String>,
}

/// Inserts a new order, its item snapshots and the seed `Pending` history entry. This is not atomic on its
/// own; the caller wraps it in a transaction and passes `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderApiError> {
    let id = OrderId::generate();
    let transaction_id = generate_transaction_id();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO orders (
            order_id, customer_name, customer_email, order_timestamp, total_cents, payment_method,
            transaction_id, status, full_name, street, city, state, zip, country, phone, lat, lng
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "#,
    )
    .bind(id.as_str())
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(now)
    .bind(order.total)
    .bind(order.payment_method.to_string())
    .bind(&transaction_id)
    .bind(OrderStatusType::Pending.to_string())
    .bind(&order.address.full_name)
    .bind(&order.address.street)
    .bind(&order.address.city)
    .bind(&order.address.state)
    .bind(&order.address.zip)
    .bind(&order.address.country)
    .bind(&order.address.phone)
    .bind(order.address.location.map(|l| l.lat))
    .bind(order.address.location.map(|l| l.lng))
    .execute(&mut *conn)
    .await?;
    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, product_name, quantity, price_cents) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id.as_str())
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(i64::from(item.quantity))
        .bind(item.price)
        .execute(&mut *conn)
        .await?;
    }
    let seed = StatusEvent { status: OrderStatusType::Pending, timestamp: now, notes: None };
    insert_status_event(&id, &seed, conn).await?;
    Ok(Order {
        id,
        customer_name: order.customer_name,
        customer_email: order.customer_email,
        order_timestamp: now,
        items: order.items,
        total: order.total,
        payment_method: order.payment_method,
        transaction_id,
        address: order.address,
        status: OrderStatusType::Pending,
        status_history: vec![seed],
    })
}

pub async fn fetch_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, OrderApiError> {
    let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => Ok(Some(load_order(row, conn).await?)),
        None => Ok(None),
    }
}

/// The order's current status alone, for the cheap pre-check before a status change.
pub async fn fetch_status(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderStatusType>, OrderApiError> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(status.map(OrderStatusType::from))
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
pub async fn fetch_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, OrderApiError> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_unfiltered() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(email) = query.customer_email {
        where_clause.push("customer_email = ");
        where_clause.push_bind_unseparated(email);
        where_clause.push_unseparated(" COLLATE NOCASE");
    }
    if !query.statuses.is_empty() {
        let statuses = query.statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
        where_clause.push(format!("status IN ({statuses})"));
    }
    builder.push(if query.newest_first { " ORDER BY order_timestamp DESC" } else { " ORDER BY order_timestamp ASC" });
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    trace!("📑️ Executing query: {}", builder.sql());
    let rows: Vec<OrderRow> = builder.build_query_as::<OrderRow>().fetch_all(&mut *conn).await?;
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(load_order(row, conn).await?);
    }
    Ok(orders)
}

/// Sets the order's status and appends the matching history entry, guarded on the status the caller
/// validated against. Returns false (and writes nothing) if a concurrent writer got in first; the caller
/// re-reads and re-validates. The guard is what makes check-then-append atomic.
pub async fn try_update_status(
    order_id: &OrderId,
    expected: OrderStatusType,
    event: &StatusEvent,
    conn: &mut SqliteConnection,
) -> Result<bool, OrderApiError> {
    let updated = sqlx::query("UPDATE orders SET status = $1 WHERE order_id = $2 AND status = $3")
        .bind(event.status.to_string())
        .bind(order_id.as_str())
        .bind(expected.to_string())
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if updated == 0 {
        return Ok(false);
    }
    insert_status_event(order_id, event, conn).await?;
    Ok(true)
}

async fn insert_status_event(
    order_id: &OrderId,
    event: &StatusEvent,
    conn: &mut SqliteConnection,
) -> Result<(), OrderApiError> {
    sqlx::query("INSERT INTO order_status_events (order_id, status, timestamp, notes) VALUES ($1, $2, $3, $4)")
        .bind(order_id.as_str())
        .bind(event.status.to_string())
        .bind(event.timestamp)
        .bind(event.notes.as_deref())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Revenue over every non-cancelled order, plus the pending-order count, aggregated in SQL.
pub async fn order_totals(conn: &mut SqliteConnection) -> Result<OrderTotals, OrderApiError> {
    let revenue: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(total_cents), 0) FROM orders WHERE status != 'Cancelled'")
            .fetch_one(&mut *conn)
            .await?;
    let pending: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = 'Pending'")
        .fetch_one(&mut *conn)
        .await?;
    Ok(OrderTotals { total_revenue: Cents::from(revenue), pending_count: pending })
}

async fn load_order(row: OrderRow, conn: &mut SqliteConnection) -> Result<Order, OrderApiError> {
    let item_rows: Vec<ItemRow> = sqlx::query_as(
        "SELECT product_id, product_name, quantity, price_cents FROM order_items WHERE order_id = $1 ORDER BY id ASC",
    )
    .bind(&row.order_id)
    .fetch_all(&mut *conn)
    .await?;
    let items = item_rows
        .into_iter()
        .map(|r| OrderItem {
            product_id: r.product_id,
            product_name: r.product_name,
            quantity: r.quantity as u32,
            price: Cents::from(r.price_cents),
        })
        .collect();
    let event_rows: Vec<StatusEventRow> = sqlx::query_as(
        "SELECT status, timestamp, notes FROM order_status_events WHERE order_id = $1 ORDER BY id ASC",
    )
    .bind(&row.order_id)
    .fetch_all(&mut *conn)
    .await?;
    let status_history = event_rows
        .into_iter()
        .map(|r| StatusEvent { status: OrderStatusType::from(r.status), timestamp: r.timestamp, notes: r.notes })
        .collect();
    Ok(row.into_order(items, status_history))
}
