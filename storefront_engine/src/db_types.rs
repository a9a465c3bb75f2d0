use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use storefront_common::Cents;
use thiserror::Error;

//--------------------------------------        OrderId        --------------------------------------------------------
/// Opaque order identifier, assigned by the store at creation and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Mints a fresh order id. The millisecond timestamp keeps ids roughly sortable; the random suffix makes
    /// collisions between orders placed in the same millisecond a non-issue.
    pub fn generate() -> Self {
        Self(format!("ord_{}_{}", Utc::now().timestamp_millis(), random_suffix(6)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Generates an opaque identifier for the payment attempt backing an order.
pub fn generate_transaction_id() -> String {
    format!("txn_{}_{}", Utc::now().timestamp_millis(), random_suffix(6))
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

//--------------------------------------   OrderStatusType     --------------------------------------------------------
/// The closed set of order lifecycle states.
///
/// The happy path is linear: `Pending → Processing → Shipped → Out for Delivery → Delivered`. `Cancelled` is
/// reachable from `Pending` for customers, and from any non-terminal state for operators. `Delivered` and
/// `Cancelled` are terminal. The rules live in [`crate::transitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been placed and no one has started working on it yet.
    Pending,
    /// The order has been picked up by the store and is being prepared.
    Processing,
    /// The order has been handed to a carrier.
    Shipped,
    /// The order is on a delivery vehicle.
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    /// The order reached the customer. Terminal.
    Delivered,
    /// The order was cancelled by the customer or an operator. Terminal.
    Cancelled,
}

impl OrderStatusType {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Delivered | OrderStatusType::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Processing => write!(f, "Processing"),
            OrderStatusType::Shipped => write!(f, "Shipped"),
            OrderStatusType::OutForDelivery => write!(f, "Out for Delivery"),
            OrderStatusType::Delivered => write!(f, "Delivered"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Out for Delivery" => Ok(Self::OutForDelivery),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentMethod      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Card,
    #[serde(rename = "COD")]
    Cod,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "Card"),
            PaymentMethod::Cod => write!(f, "COD"),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Card" => Self::Card,
            "COD" => Self::Cod,
            _ => {
                error!("Invalid payment method: {value}. But this conversion cannot fail. Defaulting to COD");
                Self::Cod
            },
        }
    }
}

//--------------------------------------      OrderItem        --------------------------------------------------------
/// One line of an order. The name and price are snapshots of catalog values at order time, so historical
/// orders stay stable when the catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: Cents,
}

impl OrderItem {
    pub fn subtotal(&self) -> Cents {
        self.price * i64::from(self.quantity)
    }
}

//--------------------------------------   ShippingAddress     --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

/// Shipping address snapshot taken at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

impl ShippingAddress {
    /// Returns the name of the first required address field that is blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        let fields = [
            ("address.fullName", &self.full_name),
            ("address.street", &self.street),
            ("address.city", &self.city),
            ("address.state", &self.state),
            ("address.zip", &self.zip),
            ("address.country", &self.country),
            ("address.phone", &self.phone),
        ];
        fields.into_iter().find(|(_, v)| v.trim().is_empty()).map(|(name, _)| name)
    }
}

//--------------------------------------     StatusEvent       --------------------------------------------------------
/// One entry of an order's append-only status history. Entries are never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: OrderStatusType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StatusEvent {
    /// Builds an event for `status`, stamped with the current time.
    pub fn now(status: OrderStatusType, notes: Option<String>) -> Self {
        Self { status, timestamp: Utc::now(), notes }
    }
}

//--------------------------------------        Order          --------------------------------------------------------
/// A customer purchase transaction, including its full status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    /// Join key to the customer directory; matched case-insensitively.
    pub customer_email: String,
    pub order_timestamp: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub total: Cents,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub address: ShippingAddress,
    pub status: OrderStatusType,
    /// Non-empty; the last entry always matches `status`, and timestamps are non-decreasing.
    pub status_history: Vec<StatusEvent>,
}

//--------------------------------------       NewOrder        --------------------------------------------------------
/// Caller-supplied data for a new order, before the store assigns identifiers and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderItem>,
    pub total: Cents,
    pub payment_method: PaymentMethod,
    pub address: ShippingAddress,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderValidationError {
    #[error("An order must contain at least one item")]
    NoItems,
    #[error("Missing or blank {0}")]
    MissingField(&'static str),
    #[error("Item quantities must be at least 1")]
    ZeroQuantity,
    #[error("Order total ({supplied}) does not match the sum of its items ({computed})")]
    TotalMismatch { supplied: Cents, computed: Cents },
}

impl NewOrder {
    /// The authoritative total: the sum of the item subtotals.
    pub fn items_total(&self) -> Cents {
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    /// Rejects malformed drafts: missing customer identity, an empty item list, blank address fields, and a
    /// `total` that does not match the item subtotals. Totals are verified server-side rather than trusted.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.customer_name.trim().is_empty() {
            return Err(OrderValidationError::MissingField("customer.name"));
        }
        if self.customer_email.trim().is_empty() {
            return Err(OrderValidationError::MissingField("customer.email"));
        }
        if self.items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }
        if self.items.iter().any(|i| i.quantity == 0) {
            return Err(OrderValidationError::ZeroQuantity);
        }
        if let Some(field) = self.address.missing_field() {
            return Err(OrderValidationError::MissingField(field));
        }
        let computed = self.items_total();
        if computed != self.total {
            return Err(OrderValidationError::TotalMismatch { supplied: self.total, computed });
        }
        Ok(())
    }
}

//--------------------------------------     StockStatus       --------------------------------------------------------
/// Catalog availability label, derived deterministically from the stock count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    pub fn for_stock(stock: i64) -> Self {
        match stock {
            s if s > 10 => Self::InStock,
            s if s > 0 => Self::LowStock,
            _ => Self::OutOfStock,
        }
    }
}

impl Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "In Stock"),
            StockStatus::LowStock => write!(f, "Low Stock"),
            StockStatus::OutOfStock => write!(f, "Out of Stock"),
        }
    }
}

impl From<String> for StockStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "In Stock" => Self::InStock,
            "Low Stock" => Self::LowStock,
            "Out of Stock" => Self::OutOfStock,
            _ => {
                error!("Invalid stock status: {value}. But this conversion cannot fail. Defaulting to Out of Stock");
                Self::OutOfStock
            },
        }
    }
}

//--------------------------------------       Product         --------------------------------------------------------
/// A catalog entry. Orders copy the name and price at creation time; they never reference products live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: Cents,
    pub stock: i64,
    pub status: StockStatus,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Cents,
    pub stock: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewProduct {
    /// The image url to store: the supplied one, or a deterministic placeholder derived from the name.
    pub fn image_url_or_default(&self) -> String {
        match &self.image_url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!("https://picsum.photos/seed/{}/400", self.name.replace(char::is_whitespace, "")),
        }
    }
}

/// Partial update for a catalog entry. Only the supplied fields change; a stock change re-derives the status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<Cents>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.image_url.is_none()
            && self.description.is_none()
    }
}

//--------------------------------------       Customer        --------------------------------------------------------
/// A registered customer. Orders only read the name and email to stamp onto the order snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
}

/// Per-customer spending summary, derived from non-cancelled orders joined to the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub total_spent: Cents,
    pub last_order: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use storefront_common::Cents;

    use super::*;

    fn item(product_id: &str, quantity: u32, price: i64) -> OrderItem {
        OrderItem {
            product_id: product_id.to_string(),
            product_name: format!("Product {product_id}"),
            quantity,
            price: Cents::from(price),
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".into(),
            street: "12 Analytical Row".into(),
            city: "London".into(),
            state: "LDN".into(),
            zip: "E1 6AN".into(),
            country: "UK".into(),
            phone: "+44 20 1234 5678".into(),
            location: None,
        }
    }

    fn draft() -> NewOrder {
        NewOrder {
            customer_name: "Ada Lovelace".into(),
            customer_email: "ada@example.com".into(),
            items: vec![item("p1", 2, 100)],
            total: Cents::from(200),
            payment_method: PaymentMethod::Cod,
            address: address(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        draft().validate().expect("draft should be valid");
    }

    #[test]
    fn empty_items_rejected() {
        let mut d = draft();
        d.items.clear();
        assert_eq!(d.validate(), Err(OrderValidationError::NoItems));
    }

    #[test]
    fn blank_address_field_rejected() {
        let mut d = draft();
        d.address.zip = "  ".into();
        assert_eq!(d.validate(), Err(OrderValidationError::MissingField("address.zip")));
    }

    #[test]
    fn total_mismatch_rejected() {
        let mut d = draft();
        d.total = Cents::from(150);
        let err = d.validate().unwrap_err();
        assert_eq!(
            err,
            OrderValidationError::TotalMismatch { supplied: Cents::from(150), computed: Cents::from(200) }
        );
    }

    #[test]
    fn status_wire_names_round_trip() {
        assert_eq!("Out for Delivery".parse::<OrderStatusType>().unwrap(), OrderStatusType::OutForDelivery);
        assert_eq!(OrderStatusType::OutForDelivery.to_string(), "Out for Delivery");
        assert!("Sideways".parse::<OrderStatusType>().is_err());
    }

    #[test]
    fn stock_status_derivation() {
        assert_eq!(StockStatus::for_stock(11), StockStatus::InStock);
        assert_eq!(StockStatus::for_stock(10), StockStatus::LowStock);
        assert_eq!(StockStatus::for_stock(1), StockStatus::LowStock);
        assert_eq!(StockStatus::for_stock(0), StockStatus::OutOfStock);
    }
}
