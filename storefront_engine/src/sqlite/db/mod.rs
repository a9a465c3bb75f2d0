pub mod customers;
pub mod orders;
pub mod products;

use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const SQLITE_DB_URL: &str = "sqlite://data/storefront.db";

pub fn db_url() -> String {
    let result = env::var("SFS_DATABASE_URL").unwrap_or_else(|_| {
        info!("SFS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// Creates the connection pool and applies the schema. WAL mode keeps readers out of the writers' way, and
/// the busy timeout lets briefly-contended writes queue instead of failing.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// The storefront schema. Every statement is idempotent, so this runs unconditionally at startup.
async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    const STATEMENTS: [&str; 8] = [
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            order_id        TEXT PRIMARY KEY,
            customer_name   TEXT NOT NULL,
            customer_email  TEXT NOT NULL,
            order_timestamp TEXT NOT NULL,
            total_cents     INTEGER NOT NULL,
            payment_method  TEXT NOT NULL,
            transaction_id  TEXT NOT NULL,
            status          TEXT NOT NULL,
            full_name       TEXT NOT NULL,
            street          TEXT NOT NULL,
            city            TEXT NOT NULL,
            state           TEXT NOT NULL,
            zip             TEXT NOT NULL,
            country         TEXT NOT NULL,
            phone           TEXT NOT NULL,
            lat             REAL,
            lng             REAL
        )"#,
        "CREATE INDEX IF NOT EXISTS idx_orders_customer_email ON orders (customer_email COLLATE NOCASE)",
        r#"
        CREATE TABLE IF NOT EXISTS order_items (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id     TEXT NOT NULL REFERENCES orders (order_id) ON DELETE CASCADE,
            product_id   TEXT NOT NULL,
            product_name TEXT NOT NULL,
            quantity     INTEGER NOT NULL,
            price_cents  INTEGER NOT NULL
        )"#,
        "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items (order_id)",
        r#"
        CREATE TABLE IF NOT EXISTS order_status_events (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id  TEXT NOT NULL REFERENCES orders (order_id) ON DELETE CASCADE,
            status    TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            notes     TEXT
        )"#,
        "CREATE INDEX IF NOT EXISTS idx_status_events_order ON order_status_events (order_id)",
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            category    TEXT NOT NULL,
            price_cents INTEGER NOT NULL,
            stock       INTEGER NOT NULL DEFAULT 0,
            status      TEXT NOT NULL,
            image_url   TEXT NOT NULL,
            description TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        )"#,
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            email      TEXT NOT NULL UNIQUE COLLATE NOCASE,
            avatar_url TEXT NOT NULL,
            created_at TEXT NOT NULL
        )"#,
    ];
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
