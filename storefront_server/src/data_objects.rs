use serde::{Deserialize, Serialize};
use storefront_common::Cents;
use storefront_engine::db_types::{NewOrder, Order, OrderItem, OrderStatusType, PaymentMethod, ShippingAddress};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerIdent {
    pub name: String,
    pub email: String,
}

/// Wire shape of `POST /api/orders`. Field-level validation (items, totals, address) happens in the engine;
/// this type only mirrors the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    pub customer: CustomerIdent,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total: Cents,
    pub payment_method: PaymentMethod,
    pub address: ShippingAddress,
}

impl NewOrderRequest {
    pub fn into_draft(self) -> NewOrder {
        NewOrder {
            customer_name: self.customer.name,
            customer_email: self.customer.email,
            items: self.items,
            total: self.total,
            payment_method: self.payment_method,
            address: self.address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatusType,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerOrdersQuery {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub message: String,
    pub order: Order,
}

impl PlaceOrderResponse {
    pub fn new(order: Order) -> Self {
        Self { message: "Order placed successfully".to_string(), order }
    }
}
