//! End-to-end exercises of the order lifecycle against a real SQLite database.

use storefront_common::Cents;
use storefront_engine::{
    db_types::{NewCustomer, NewOrder, NewProduct, OrderItem, OrderStatusType, PaymentMethod, ShippingAddress},
    events::{DashboardEvent, EventBroadcaster, EventProducers},
    order_objects::OrderQueryFilter,
    transitions::{Initiator, TransitionError},
    CustomerApi,
    OrderApiError,
    OrderFlowApi,
    OrderManagement,
    ProductCatalog,
    SqliteDatabase,
};
use tempfile::TempDir;

/// A fresh database in a temp directory. The directory handle must stay alive for the duration of the test.
async fn new_test_db() -> (SqliteDatabase, TempDir) {
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().expect("Error creating temp dir");
    let url = format!("sqlite://{}", dir.path().join("storefront.db").display());
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating test database");
    (db, dir)
}

fn order_api(db: &SqliteDatabase) -> (OrderFlowApi<SqliteDatabase>, EventBroadcaster) {
    let broadcaster = EventBroadcaster::new(16);
    let api = OrderFlowApi::new(db.clone(), EventProducers::default(), broadcaster.clone());
    (api, broadcaster)
}

fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Grace Hopper".into(),
        street: "1 Harbor Way".into(),
        city: "Arlington".into(),
        state: "VA".into(),
        zip: "22202".into(),
        country: "USA".into(),
        phone: "+1 555 0100".into(),
        location: None,
    }
}

fn draft_for(email: &str, price: i64, quantity: u32) -> NewOrder {
    NewOrder {
        customer_name: "Grace Hopper".into(),
        customer_email: email.into(),
        items: vec![OrderItem {
            product_id: "p1".into(),
            product_name: "Compiler Manual".into(),
            quantity,
            price: Cents::from(price),
        }],
        total: Cents::from(price * i64::from(quantity)),
        payment_method: PaymentMethod::Cod,
        address: address(),
    }
}

#[tokio::test]
async fn placing_an_order_seeds_a_pending_history() {
    let (db, _dir) = new_test_db().await;
    let (api, broadcaster) = order_api(&db);
    let mut rx = broadcaster.subscribe();

    let order = api.place_order(draft_for("grace@example.com", 100, 2)).await.expect("order should be placed");
    assert_eq!(order.status, OrderStatusType::Pending);
    assert_eq!(order.total, Cents::from(200));
    assert_eq!(order.status_history.len(), 1);
    assert_eq!(order.status_history[0].status, OrderStatusType::Pending);
    assert!(order.transaction_id.starts_with("txn_"));

    // Persisted copy matches what the API returned
    let stored = db.fetch_order_by_id(&order.id).await.unwrap().expect("order should be stored");
    assert_eq!(stored, order);

    // new_order first, then the recomputed stats
    match rx.recv().await.unwrap() {
        DashboardEvent::NewOrder(o) => assert_eq!(o.id, order.id),
        other => panic!("Expected new_order, got {}", other.topic()),
    }
    match rx.recv().await.unwrap() {
        DashboardEvent::StatsUpdate(stats) => {
            assert_eq!(stats.total_revenue, Cents::from(200));
            assert_eq!(stats.new_orders_count, 1);
        },
        other => panic!("Expected stats_update, got {}", other.topic()),
    }
}

#[tokio::test]
async fn total_mismatch_is_rejected() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    let mut draft = draft_for("grace@example.com", 100, 2);
    draft.total = Cents::from(150);
    let err = api.place_order(draft).await.unwrap_err();
    assert!(matches!(err, OrderApiError::Validation(_)), "got {err}");
    assert!(api.fetch_all_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn status_update_appends_history_and_publishes() {
    let (db, _dir) = new_test_db().await;
    let (api, broadcaster) = order_api(&db);
    let order = api.place_order(draft_for("grace@example.com", 100, 2)).await.unwrap();

    let mut rx = broadcaster.subscribe();
    let updated = api
        .set_status(&order.id, OrderStatusType::Shipped, Some("carrier X".into()), Initiator::Operator)
        .await
        .expect("transition should be legal");
    assert_eq!(updated.status, OrderStatusType::Shipped);
    assert_eq!(updated.status_history.len(), 2);
    let last = updated.status_history.last().unwrap();
    assert_eq!(last.status, OrderStatusType::Shipped);
    assert_eq!(last.notes.as_deref(), Some("carrier X"));
    assert!(updated.status_history[0].timestamp <= last.timestamp);

    match rx.recv().await.unwrap() {
        DashboardEvent::OrderUpdated(o) => assert_eq!(o.status, OrderStatusType::Shipped),
        other => panic!("Expected order_updated, got {}", other.topic()),
    }
    assert_eq!(rx.recv().await.unwrap().topic(), "stats_update");
}

#[tokio::test]
async fn cancelling_an_order_publishes_the_refund_notice() {
    let (db, _dir) = new_test_db().await;
    let (api, broadcaster) = order_api(&db);
    let order = api.place_order(draft_for("grace@example.com", 100, 2)).await.unwrap();

    let mut rx = broadcaster.subscribe();
    let cancelled =
        api.set_status(&order.id, OrderStatusType::Cancelled, None, Initiator::Operator).await.unwrap();
    assert_eq!(cancelled.status, OrderStatusType::Cancelled);

    assert_eq!(rx.recv().await.unwrap().topic(), "order_updated");
    match rx.recv().await.unwrap() {
        DashboardEvent::StatsUpdate(stats) => {
            // Revenue drops to zero once the only order is cancelled
            assert_eq!(stats.total_revenue, Cents::from(0));
            assert_eq!(stats.new_orders_count, 0);
        },
        other => panic!("Expected stats_update, got {}", other.topic()),
    }
    match rx.recv().await.unwrap() {
        DashboardEvent::OrderCancelled(payload) => {
            assert_eq!(payload.order.id, order.id);
            assert_eq!(payload.message, "Refund may be required.");
        },
        other => panic!("Expected order_cancelled, got {}", other.topic()),
    }
}

#[tokio::test]
async fn customer_cancel_is_rejected_once_processing_starts() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    let order = api.place_order(draft_for("grace@example.com", 100, 2)).await.unwrap();
    api.set_status(&order.id, OrderStatusType::Shipped, None, Initiator::Operator).await.unwrap();

    let err = api.cancel_order(&order.id).await.unwrap_err();
    assert!(matches!(err, OrderApiError::Transition(TransitionError::AlreadyProcessed)), "got {err}");

    // The failed cancel left the order untouched
    let stored = db.fetch_order_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatusType::Shipped);
    assert_eq!(stored.status_history.len(), 2);
}

#[tokio::test]
async fn second_cancel_fails_and_preserves_the_first() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    let order = api.place_order(draft_for("grace@example.com", 100, 2)).await.unwrap();

    let cancelled = api.cancel_order(&order.id).await.expect("first cancel should succeed");
    assert_eq!(cancelled.status, OrderStatusType::Cancelled);
    assert_eq!(cancelled.status_history.last().unwrap().notes.as_deref(), Some("Cancelled by customer"));

    let err = api.cancel_order(&order.id).await.unwrap_err();
    assert!(matches!(err, OrderApiError::Transition(TransitionError::AlreadyProcessed)), "got {err}");
    let stored = db.fetch_order_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status_history, cancelled.status_history);
}

#[tokio::test]
async fn delivered_orders_are_terminal() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    let order = api.place_order(draft_for("grace@example.com", 100, 2)).await.unwrap();
    api.set_status(&order.id, OrderStatusType::Delivered, None, Initiator::Operator).await.unwrap();

    let err = api.set_status(&order.id, OrderStatusType::Processing, None, Initiator::Operator).await.unwrap_err();
    assert!(
        matches!(err, OrderApiError::Transition(TransitionError::TerminalState(OrderStatusType::Delivered))),
        "got {err}"
    );
}

#[tokio::test]
async fn unknown_orders_report_not_found() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    let missing = "ord_does_not_exist".parse().unwrap();
    let err = api.set_status(&missing, OrderStatusType::Shipped, None, Initiator::Operator).await.unwrap_err();
    assert!(matches!(err, OrderApiError::OrderNotFound(_)), "got {err}");
}

#[tokio::test]
async fn revenue_excludes_cancelled_orders_and_recent_is_capped() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);

    let mut ids = Vec::new();
    for i in 1..=6 {
        let order = api.place_order(draft_for("grace@example.com", 100 * i, 1)).await.unwrap();
        ids.push(order.id);
        // Keep order timestamps strictly increasing so "newest first" is deterministic
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    api.cancel_order(&ids[0]).await.unwrap();

    let stats = api.dashboard_stats().await.unwrap();
    // 200 + 300 + 400 + 500 + 600; the cancelled 100 order no longer counts
    assert_eq!(stats.total_revenue, Cents::from(2000));
    assert_eq!(stats.new_orders_count, 5);
    assert_eq!(stats.recent_orders.len(), 5);
    let timestamps: Vec<_> = stats.recent_orders.iter().map(|o| o.order_timestamp).collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted, "recent orders should be newest first");
}

#[tokio::test]
async fn orders_by_customer_match_case_insensitively_newest_first() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    api.place_order(draft_for("Grace@Example.com", 100, 1)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    api.place_order(draft_for("grace@example.com", 200, 1)).await.unwrap();
    api.place_order(draft_for("someone-else@example.com", 300, 1)).await.unwrap();

    let orders = api.fetch_orders_for_customer("GRACE@EXAMPLE.COM").await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].total, Cents::from(200));
    assert_eq!(orders[1].total, Cents::from(100));
}

#[tokio::test]
async fn orders_can_be_filtered_by_status() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    let first = api.place_order(draft_for("grace@example.com", 100, 1)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = api.place_order(draft_for("grace@example.com", 200, 1)).await.unwrap();
    api.set_status(&second.id, OrderStatusType::Shipped, None, Initiator::Operator).await.unwrap();

    let query = OrderQueryFilter::default().with_status(OrderStatusType::Pending).oldest_first();
    let pending = db.fetch_orders(query).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, first.id);

    let query = OrderQueryFilter::default()
        .with_status(OrderStatusType::Pending)
        .with_status(OrderStatusType::Shipped)
        .oldest_first();
    let both = db.fetch_orders(query).await.unwrap();
    assert_eq!(both.len(), 2);
    assert_eq!(both[0].id, first.id, "oldest first");
}

#[tokio::test]
async fn concurrent_status_updates_are_both_recorded() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    let order = api.place_order(draft_for("grace@example.com", 100, 2)).await.unwrap();

    let (a, b) = tokio::join!(
        api.set_status(&order.id, OrderStatusType::Processing, None, Initiator::Operator),
        api.set_status(&order.id, OrderStatusType::Shipped, None, Initiator::Operator),
    );
    a.expect("first concurrent update should succeed");
    b.expect("second concurrent update should succeed");

    let stored = db.fetch_order_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status_history.len(), 3, "no history entry may be lost");
    assert_eq!(stored.status_history.last().unwrap().status, stored.status);
}

#[tokio::test]
async fn product_count_feeds_the_dashboard() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    db.insert_product(NewProduct {
        name: "Organic Honey".into(),
        category: "Pantry".into(),
        price: Cents::from(750),
        stock: 12,
        image_url: None,
        description: None,
    })
    .await
    .unwrap();

    let stats = api.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_products, 1);
}

#[tokio::test]
async fn customer_summaries_aggregate_spend_by_email() {
    let (db, _dir) = new_test_db().await;
    let (api, _) = order_api(&db);
    let customers = CustomerApi::new(db.clone());
    customers
        .register_customer(NewCustomer { name: "Grace Hopper".into(), email: "grace@example.com".into() })
        .await
        .unwrap();

    api.place_order(draft_for("Grace@Example.com", 100, 1)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = api.place_order(draft_for("grace@example.com", 200, 1)).await.unwrap();
    let cancelled = api.place_order(draft_for("grace@example.com", 400, 1)).await.unwrap();
    api.cancel_order(&cancelled.id).await.unwrap();

    let summaries = customers.customer_summaries().await.unwrap();
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.email, "grace@example.com");
    assert_eq!(summary.total_spent, Cents::from(300));
    assert_eq!(summary.last_order, second.order_timestamp);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (db, _dir) = new_test_db().await;
    let customers = CustomerApi::new(db.clone());
    customers
        .register_customer(NewCustomer { name: "Grace Hopper".into(), email: "grace@example.com".into() })
        .await
        .unwrap();
    let err = customers
        .register_customer(NewCustomer { name: "Impostor".into(), email: "GRACE@example.com".into() })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"), "got {err}");
}
