use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use storefront_common::Cents;

use crate::{
    db_types::{Customer, CustomerSummary, NewCustomer},
    traits::CustomerApiError,
};

#[derive(Debug, Clone, FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    email: String,
    avatar_url: String,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
        }
    }
}

pub async fn insert_customer(customer: NewCustomer, conn: &mut SqliteConnection) -> Result<Customer, CustomerApiError> {
    let avatar_url = format!("https://i.pravatar.cc/150?u={}", customer.email);
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO customers (name, email, avatar_url, created_at) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&avatar_url)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(Customer { id, name: customer.name, email: customer.email, avatar_url, created_at: now })
}

pub async fn fetch_customer_by_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Customer>, CustomerApiError> {
    let row: Option<CustomerRow> = sqlx::query_as("SELECT * FROM customers WHERE email = $1 COLLATE NOCASE")
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(Customer::from))
}

#[derive(Debug, Clone, FromRow)]
struct SummaryRow {
    id: i64,
    name: String,
    email: String,
    avatar_url: String,
    total_spent: i64,
    last_order: DateTime<Utc>,
}

/// Spend per registered customer over their non-cancelled orders, joined case-insensitively on email.
/// Customers without orders, and orders from unregistered emails, drop out of the join.
pub async fn customer_summaries(conn: &mut SqliteConnection) -> Result<Vec<CustomerSummary>, CustomerApiError> {
    let rows: Vec<SummaryRow> = sqlx::query_as(
        r#"
        SELECT c.id, c.name, c.email, c.avatar_url,
               COALESCE(SUM(o.total_cents), 0) AS total_spent,
               MAX(o.order_timestamp) AS last_order
        FROM customers c
        JOIN orders o ON lower(o.customer_email) = lower(c.email)
        WHERE o.status != 'Cancelled'
        GROUP BY c.id, c.name, c.email, c.avatar_url
        ORDER BY last_order DESC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| CustomerSummary {
            id: r.id,
            name: r.name,
            email: r.email,
            avatar_url: r.avatar_url,
            total_spent: Cents::from(r.total_spent),
            last_order: r.last_order,
        })
        .collect())
}
