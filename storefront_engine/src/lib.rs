//! Storefront Order Engine
//!
//! The storefront engine is the order lifecycle and notification core of the storefront backend. It is
//! web-framework agnostic; the HTTP surface lives in the companion server crate.
//!
//! The library is divided into three main sections:
//! 1. The domain model and database layer. Orders, their append-only status history, the product catalog and
//!    the customer directory are defined in [`db_types`], and persisted by backends implementing the traits in
//!    [`traits`]. SQLite is the provided backend ([`SqliteDatabase`]); you should never need to touch the
//!    database directly — use the public APIs instead.
//! 2. The public APIs ([`mod@api`]). [`OrderFlowApi`] orchestrates every externally-triggered order action
//!    (place, change status, cancel) and guarantees that the store mutation is durable before anything is
//!    broadcast. [`CatalogApi`] and [`CustomerApi`] cover the catalog and customer directory.
//! 3. Events ([`mod@events`]). Every mutation is fanned out to connected dashboard subscribers through the
//!    [`events::EventBroadcaster`], and a small hook system lets deployments attach custom async handlers to
//!    order events without touching the request path.

pub mod api;
pub mod db_types;
pub mod events;
pub mod traits;
pub mod transitions;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use api::{
    order_objects,
    stats,
    CatalogApi,
    CustomerApi,
    OrderFlowApi,
};
pub use traits::{
    CatalogApiError,
    CustomerApiError,
    CustomerDirectory,
    OrderApiError,
    OrderManagement,
    ProductCatalog,
    StorefrontDatabase,
};
