use chrono::{TimeZone, Utc};
use mockall::mock;
use storefront_common::Cents;
use storefront_engine::{
    api::{
        order_objects::{OrderChanged, OrderQueryFilter},
        stats::OrderTotals,
    },
    db_types::{
        Customer,
        CustomerSummary,
        NewCustomer,
        NewOrder,
        NewProduct,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        PaymentMethod,
        Product,
        ProductUpdate,
        ShippingAddress,
        StatusEvent,
        StockStatus,
    },
    traits::{CatalogApiError, CustomerApiError, CustomerDirectory, OrderApiError, OrderManagement, ProductCatalog},
    transitions::Initiator,
};

mock! {
    pub StorefrontDb {}

    impl OrderManagement for StorefrontDb {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderApiError>;
        async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderApiError>;
        async fn fetch_orders_for_email(&self, email: &str) -> Result<Vec<Order>, OrderApiError>;
        async fn fetch_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderApiError>;
        async fn apply_status_change(&self, id: &OrderId, new_status: OrderStatusType, notes: Option<String>, initiator: Initiator) -> Result<OrderChanged, OrderApiError>;
        async fn order_totals(&self) -> Result<OrderTotals, OrderApiError>;
    }

    impl ProductCatalog for StorefrontDb {
        async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;
        async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogApiError>;
        async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError>;
        async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogApiError>;
        async fn delete_product(&self, id: i64) -> Result<bool, CatalogApiError>;
        async fn product_count(&self) -> Result<i64, CatalogApiError>;
    }

    impl CustomerDirectory for StorefrontDb {
        async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError>;
        async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CustomerApiError>;
        async fn customer_summaries(&self) -> Result<Vec<CustomerSummary>, CustomerApiError>;
    }

    impl Clone for StorefrontDb {
        fn clone(&self) -> Self;
    }
}

/// A minimal, deterministic order for mock responses.
pub fn sample_order(status: OrderStatusType) -> Order {
    let ts = Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap();
    Order {
        id: OrderId("ord_0000001".into()),
        customer_name: "Grace Hopper".into(),
        customer_email: "grace@example.com".into(),
        order_timestamp: ts,
        items: vec![OrderItem {
            product_id: "p1".into(),
            product_name: "Compiler Manual".into(),
            quantity: 2,
            price: Cents::from(100),
        }],
        total: Cents::from(200),
        payment_method: PaymentMethod::Cod,
        transaction_id: "txn_0000001".into(),
        address: ShippingAddress {
            full_name: "Grace Hopper".into(),
            street: "1 Harbor Way".into(),
            city: "Arlington".into(),
            state: "VA".into(),
            zip: "22202".into(),
            country: "USA".into(),
            phone: "+1 555 0100".into(),
            location: None,
        },
        status,
        status_history: vec![StatusEvent { status: OrderStatusType::Pending, timestamp: ts, notes: None }],
    }
}

pub fn sample_product() -> Product {
    let ts = Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap();
    Product {
        id: 1,
        name: "Organic Honey".into(),
        category: "Pantry".into(),
        price: Cents::from(750),
        stock: 12,
        status: StockStatus::InStock,
        image_url: "https://picsum.photos/seed/OrganicHoney/400".into(),
        description: None,
        created_at: ts,
        updated_at: ts,
    }
}
