use std::fmt::Debug;

use log::*;

use crate::{
    api::stats,
    db_types::{NewProduct, Product, ProductUpdate},
    events::EventBroadcaster,
    traits::{CatalogApiError, ProductCatalog, StorefrontDatabase},
};

/// Catalog management. Mutations push a fresh `stats_update` to the dashboards since the product count is
/// part of the stats snapshot.
pub struct CatalogApi<B> {
    db: B,
    broadcaster: EventBroadcaster,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B, broadcaster: EventBroadcaster) -> Self {
        Self { db, broadcaster }
    }
}

impl<B> CatalogApi<B>
where B: ProductCatalog
{
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError> {
        self.db.fetch_products().await
    }

    pub async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogApiError> {
        self.db.fetch_product(id).await
    }
}

impl<B> CatalogApi<B>
where B: StorefrontDatabase
{
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        if product.name.trim().is_empty() {
            return Err(CatalogApiError::MissingField("name"));
        }
        if product.category.trim().is_empty() {
            return Err(CatalogApiError::MissingField("category"));
        }
        let product = self.db.insert_product(product).await?;
        info!("📦️ Product #{} ({}) added to the catalog as {}", product.id, product.name, product.status);
        stats::broadcast_stats(&self.db, &self.broadcaster).await;
        Ok(product)
    }

    pub async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError> {
        let product = self.db.update_product(id, update).await?.ok_or(CatalogApiError::ProductNotFound(id))?;
        debug!("📦️ Product #{} updated. Stock status is now {}", product.id, product.status);
        stats::broadcast_stats(&self.db, &self.broadcaster).await;
        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError> {
        if !self.db.delete_product(id).await? {
            return Err(CatalogApiError::ProductNotFound(id));
        }
        info!("📦️ Product #{id} removed from the catalog");
        stats::broadcast_stats(&self.db, &self.broadcaster).await;
        Ok(())
    }
}
