use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use storefront_common::Cents;
use storefront_engine::{api::stats::OrderTotals, events::EventBroadcaster, CatalogApi};

use super::{
    helpers::{delete_request, get_request, post_request},
    mocks::{sample_product, MockStorefrontDb},
};
use crate::routes::{CreateProductRoute, DeleteProductRoute, GetProductRoute, ListProductsRoute};

fn catalog_api(db: MockStorefrontDb) -> web::Data<CatalogApi<MockStorefrontDb>> {
    web::Data::new(CatalogApi::new(db, EventBroadcaster::new(8)))
}

fn expect_stats_calls(db: &mut MockStorefrontDb) {
    db.expect_order_totals().returning(|| Ok(OrderTotals { total_revenue: Cents::from(0), pending_count: 0 }));
    db.expect_product_count().returning(|| Ok(1));
    db.expect_fetch_orders().returning(|_| Ok(vec![]));
}

#[actix_web::test]
async fn create_product_returns_the_catalog_entry() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockStorefrontDb::new();
        db.expect_insert_product().returning(|_| Ok(sample_product()));
        expect_stats_calls(&mut db);
        cfg.service(CreateProductRoute::<MockStorefrontDb>::new()).app_data(catalog_api(db));
    }
    let body = json!({ "name": "Organic Honey", "category": "Pantry", "price": 750, "stock": 12 });
    let (status, body) = post_request("/products", body, configure).await;
    assert_eq!(status, StatusCode::CREATED);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["status"], "In Stock");
    assert_eq!(v["imageUrl"], "https://picsum.photos/seed/OrganicHoney/400");
}

#[actix_web::test]
async fn create_product_requires_a_name() {
    fn configure(cfg: &mut ServiceConfig) {
        cfg.service(CreateProductRoute::<MockStorefrontDb>::new()).app_data(catalog_api(MockStorefrontDb::new()));
    }
    let body = json!({ "name": "  ", "category": "Pantry", "price": 750, "stock": 12 });
    let (status, body) = post_request("/products", body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("name"), "body was: {body}");
}

#[actix_web::test]
async fn list_products_returns_the_catalog() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockStorefrontDb::new();
        db.expect_fetch_products().returning(|| Ok(vec![sample_product()]));
        cfg.service(ListProductsRoute::<MockStorefrontDb>::new()).app_data(catalog_api(db));
    }
    let (status, body) = get_request("/products", configure).await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v[0]["name"], "Organic Honey");
}

#[actix_web::test]
async fn missing_product_is_a_404() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockStorefrontDb::new();
        db.expect_fetch_product().returning(|_| Ok(None));
        cfg.service(GetProductRoute::<MockStorefrontDb>::new()).app_data(catalog_api(db));
    }
    let (status, _) = get_request("/products/99", configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_an_unknown_product_is_a_404() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockStorefrontDb::new();
        db.expect_delete_product().returning(|_| Ok(false));
        cfg.service(DeleteProductRoute::<MockStorefrontDb>::new()).app_data(catalog_api(db));
    }
    let (status, _) = delete_request("/products/99", configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_a_product_returns_no_content() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockStorefrontDb::new();
        db.expect_delete_product().returning(|_| Ok(true));
        expect_stats_calls(&mut db);
        cfg.service(DeleteProductRoute::<MockStorefrontDb>::new()).app_data(catalog_api(db));
    }
    let (status, body) = delete_request("/products/1", configure).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}
