use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{FromRow, QueryBuilder, SqliteConnection};
use storefront_common::Cents;

use crate::{
    db_types::{NewProduct, Product, ProductUpdate, StockStatus},
    traits::CatalogApiError,
};

#[derive(Debug, Clone, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    category: String,
    price_cents: i64,
    stock: i64,
    status: String,
    image_url: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            price: Cents::from(row.price_cents),
            stock: row.stock,
            status: StockStatus::from(row.status),
            image_url: row.image_url,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, CatalogApiError> {
    let status = StockStatus::for_stock(product.stock);
    let image_url = product.image_url_or_default();
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO products (name, category, price_cents, stock, status, image_url, description, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.price)
    .bind(product.stock)
    .bind(status.to_string())
    .bind(&image_url)
    .bind(product.description.as_deref())
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(Product {
        id,
        name: product.name,
        category: product.category,
        price: product.price,
        stock: product.stock,
        status,
        image_url,
        description: product.description,
        created_at: now,
        updated_at: now,
    })
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, CatalogApiError> {
    let row: Option<ProductRow> =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(&mut *conn).await?;
    Ok(row.map(Product::from))
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, CatalogApiError> {
    let rows: Vec<ProductRow> = sqlx::query_as("SELECT * FROM products ORDER BY created_at DESC, id DESC")
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

/// Applies the populated fields of `update`. A stock change re-derives the stock status in the same
/// statement, so the two can never disagree.
pub async fn update_product(
    id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, CatalogApiError> {
    if update.is_empty() {
        debug!("📑️ No fields to update for product #{id}. Update request skipped.");
        return fetch_product(id, conn).await;
    }
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(", ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(category) = update.category {
        set_clause.push("category = ");
        set_clause.push_bind_unseparated(category);
    }
    if let Some(price) = update.price {
        set_clause.push("price_cents = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(stock) = update.stock {
        set_clause.push("stock = ");
        set_clause.push_bind_unseparated(stock);
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(StockStatus::for_stock(stock).to_string());
    }
    if let Some(image_url) = update.image_url {
        set_clause.push("image_url = ");
        set_clause.push_bind_unseparated(image_url);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    trace!("📑️ Executing query: {}", builder.sql());
    let result = builder.build().execute(&mut *conn).await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    fetch_product(id, conn).await
}

pub async fn delete_product(id: i64, conn: &mut SqliteConnection) -> Result<bool, CatalogApiError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn product_count(conn: &mut SqliteConnection) -> Result<i64, CatalogApiError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(&mut *conn).await?;
    Ok(count)
}
