use actix_web::{http::StatusCode, web, web::ServiceConfig};
use storefront_common::Cents;
use storefront_engine::{
    api::stats::OrderTotals,
    db_types::OrderStatusType,
    events::{EventBroadcaster, EventProducers},
    OrderFlowApi,
};

use super::{
    helpers::get_request,
    mocks::{sample_order, MockStorefrontDb},
};
use crate::routes::DashboardStatsRoute;

#[actix_web::test]
async fn dashboard_stats_snapshot_has_the_wire_shape() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockStorefrontDb::new();
        db.expect_order_totals()
            .returning(|| Ok(OrderTotals { total_revenue: Cents::from(35000), pending_count: 2 }));
        db.expect_product_count().returning(|| Ok(7));
        db.expect_fetch_orders().returning(|_| Ok(vec![sample_order(OrderStatusType::Pending)]));
        let api = OrderFlowApi::new(db, EventProducers::default(), EventBroadcaster::new(8));
        cfg.service(DashboardStatsRoute::<MockStorefrontDb>::new()).app_data(web::Data::new(api));
    }
    let (status, body) = get_request("/dashboard-stats", configure).await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["totalRevenue"], 35000);
    assert_eq!(v["newOrdersCount"], 2);
    assert_eq!(v["totalProducts"], 7);
    assert_eq!(v["recentOrders"].as_array().unwrap().len(), 1);
    assert_eq!(v["recentOrders"][0]["paymentMethod"], "COD");
}
