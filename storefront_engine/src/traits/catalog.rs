use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    traits::CatalogApiError,
};

/// The product catalog contract. The catalog is a collaborator of the order core: orders copy name/price
/// snapshots from it at creation time, and the dashboard counts it; nothing in the order flow mutates it.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    /// Stores a new product. The stock status is derived from the stock count, never taken from the caller.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogApiError>;

    /// The full catalog, newest first.
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError>;

    /// Applies the non-empty fields of `update`. A stock change re-derives the stock status in the same
    /// statement. Returns `None` if the product does not exist.
    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogApiError>;

    /// Returns true if a product was deleted, false if the id was unknown.
    async fn delete_product(&self, id: i64) -> Result<bool, CatalogApiError>;

    async fn product_count(&self) -> Result<i64, CatalogApiError>;
}
