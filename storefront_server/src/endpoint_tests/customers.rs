use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use serde_json::json;
use storefront_common::Cents;
use storefront_engine::{
    db_types::{Customer, CustomerSummary},
    CustomerApi,
};

use super::{
    helpers::{get_request, post_request},
    mocks::MockStorefrontDb,
};
use crate::routes::{ListCustomersRoute, RegisterCustomerRoute};

fn customer_api(db: MockStorefrontDb) -> web::Data<CustomerApi<MockStorefrontDb>> {
    web::Data::new(CustomerApi::new(db))
}

fn grace() -> Customer {
    Customer {
        id: 1,
        name: "Grace Hopper".into(),
        email: "grace@example.com".into(),
        avatar_url: "https://i.pravatar.cc/150?u=grace@example.com".into(),
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

#[actix_web::test]
async fn registration_returns_the_new_customer() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockStorefrontDb::new();
        db.expect_fetch_customer_by_email().returning(|_| Ok(None));
        db.expect_insert_customer().returning(|_| Ok(grace()));
        cfg.service(RegisterCustomerRoute::<MockStorefrontDb>::new()).app_data(customer_api(db));
    }
    let body = json!({ "name": "Grace Hopper", "email": "grace@example.com" });
    let (status, body) = post_request("/customers", body, configure).await;
    assert_eq!(status, StatusCode::CREATED);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["email"], "grace@example.com");
    assert!(v["avatarUrl"].as_str().unwrap().contains("pravatar"));
}

#[actix_web::test]
async fn duplicate_registration_is_a_conflict() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockStorefrontDb::new();
        db.expect_fetch_customer_by_email().returning(|_| Ok(Some(grace())));
        cfg.service(RegisterCustomerRoute::<MockStorefrontDb>::new()).app_data(customer_api(db));
    }
    let body = json!({ "name": "Impostor", "email": "grace@example.com" });
    let (status, body) = post_request("/customers", body, configure).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already exists"), "body was: {body}");
}

#[actix_web::test]
async fn summaries_list_spend_per_customer() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockStorefrontDb::new();
        db.expect_customer_summaries().returning(|| {
            Ok(vec![CustomerSummary {
                id: 1,
                name: "Grace Hopper".into(),
                email: "grace@example.com".into(),
                avatar_url: "https://i.pravatar.cc/150?u=grace@example.com".into(),
                total_spent: Cents::from(300),
                last_order: Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap(),
            }])
        });
        cfg.service(ListCustomersRoute::<MockStorefrontDb>::new()).app_data(customer_api(db));
    }
    let (status, body) = get_request("/customers", configure).await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v[0]["totalSpent"], 300);
}
