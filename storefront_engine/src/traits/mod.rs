//! Behaviour contracts for storefront storage backends.
//!
//! Backends implement the three area traits; anything that implements all of them (plus `Clone`, since the
//! server hands one instance to several APIs) is a [`StorefrontDatabase`] via the blanket impl.

mod catalog;
mod customers;
mod errors;
mod order_management;

pub use catalog::ProductCatalog;
pub use customers::CustomerDirectory;
pub use errors::{CatalogApiError, CustomerApiError, OrderApiError};
pub use order_management::OrderManagement;

pub trait StorefrontDatabase: Clone + OrderManagement + ProductCatalog + CustomerDirectory {}

impl<T> StorefrontDatabase for T where T: Clone + OrderManagement + ProductCatalog + CustomerDirectory {}
