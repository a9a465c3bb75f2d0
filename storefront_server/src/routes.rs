//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the storage backend so that endpoint tests can drop in trait mocks. actix-web
//! cannot register generic handlers directly, so each one gets a small route struct via the `route!` macro.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use storefront_engine::{
    db_types::{NewCustomer, NewProduct, OrderId, ProductUpdate},
    traits::{CustomerDirectory, OrderManagement, ProductCatalog, StorefrontDatabase},
    transitions::Initiator,
    CatalogApi,
    CustomerApi,
    OrderFlowApi,
};

use crate::{
    data_objects::{CustomerOrdersQuery, NewOrderRequest, PlaceOrderResponse, UpdateStatusRequest},
    errors::ServerError,
};

#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $bound:path) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>); }
        paste::paste! {
            impl<B> [<$name:camel Route>]<B> {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self(core::marker::PhantomData)
                }
            }
        }
        paste::paste! {
            impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
            where B: $bound + 'static
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name::<B>);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };
}

// ----------------------------------------------   Health  -----------------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Orders  -----------------------------------------------------------
route!(place_order => Post "/orders" impl StorefrontDatabase);
/// Places a new order. The body must carry the customer identity, a non-empty item list, the address and a
/// total matching the item subtotals; anything else comes back as a 400 with the reason.
pub async fn place_order<B: StorefrontDatabase>(
    api: web::Data<OrderFlowApi<B>>,
    body: web::Json<NewOrderRequest>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received place order request");
    let order = api.place_order(body.into_inner().into_draft()).await?;
    Ok(HttpResponse::Created().json(PlaceOrderResponse::new(order)))
}

route!(orders_by_customer => Get "/orders/by-customer" impl OrderManagement);
pub async fn orders_by_customer<B: OrderManagement>(
    query: web::Query<CustomerOrdersQuery>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let email = query
        .into_inner()
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequestBody("Email query parameter is required".to_string()))?;
    debug!("💻️ GET orders for customer {email}");
    let orders = api.fetch_orders_for_customer(&email).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(get_orders => Get "/orders" impl OrderManagement);
pub async fn get_orders<B: OrderManagement>(api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all orders");
    let orders = api.fetch_all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId::from(path.into_inner());
    debug!("💻️ GET order {id}");
    let order =
        api.fetch_order(&id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Order {id} not found")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Put "/orders/{id}/status" impl StorefrontDatabase);
/// Operator status change. The transition engine decides legality; an illegal move comes back as a 400
/// carrying the human-readable reason, and an unknown order as a 404.
pub async fn update_order_status<B: StorefrontDatabase>(
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId::from(path.into_inner());
    let UpdateStatusRequest { status, notes } = body.into_inner();
    debug!("💻️ PUT status {status} for order {id}");
    let order = api.set_status(&id, status, notes, Initiator::Operator).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Post "/orders/{id}/cancel" impl StorefrontDatabase);
/// Customer-initiated cancellation: only legal while the order is still `Pending`.
pub async fn cancel_order<B: StorefrontDatabase>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId::from(path.into_inner());
    debug!("💻️ POST cancel order {id}");
    let order = api.cancel_order(&id).await?;
    Ok(HttpResponse::Ok().json(order))
}

// ----------------------------------------------   Dashboard  --------------------------------------------------------
route!(dashboard_stats => Get "/dashboard-stats" impl StorefrontDatabase);
pub async fn dashboard_stats<B: StorefrontDatabase>(
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET dashboard stats");
    let stats = api.dashboard_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

// ----------------------------------------------   Products  ---------------------------------------------------------
route!(list_products => Get "/products" impl ProductCatalog);
pub async fn list_products<B: ProductCatalog>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all products");
    let products = api.fetch_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(create_product => Post "/products" impl StorefrontDatabase);
pub async fn create_product<B: StorefrontDatabase>(
    api: web::Data<CatalogApi<B>>,
    body: web::Json<NewProduct>,
) -> Result<HttpResponse, ServerError> {
    let product = api.create_product(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(get_product => Get "/products/{id}" impl ProductCatalog);
pub async fn get_product<B: ProductCatalog>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET product #{id}");
    let product =
        api.fetch_product(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Product {id} not found")))?;
    Ok(HttpResponse::Ok().json(product))
}

route!(update_product => Put "/products/{id}" impl StorefrontDatabase);
pub async fn update_product<B: StorefrontDatabase>(
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ PUT product #{id}");
    let product = api.update_product(id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl StorefrontDatabase);
pub async fn delete_product<B: StorefrontDatabase>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE product #{id}");
    api.delete_product(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ----------------------------------------------   Customers  --------------------------------------------------------
route!(register_customer => Post "/customers" impl CustomerDirectory);
pub async fn register_customer<B: CustomerDirectory>(
    api: web::Data<CustomerApi<B>>,
    body: web::Json<NewCustomer>,
) -> Result<HttpResponse, ServerError> {
    let customer = api.register_customer(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(customer))
}

route!(list_customers => Get "/customers" impl CustomerDirectory);
/// Per-customer spending summaries for the admin dashboard.
pub async fn list_customers<B: CustomerDirectory>(api: web::Data<CustomerApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET customer summaries");
    let summaries = api.customer_summaries().await?;
    Ok(HttpResponse::Ok().json(summaries))
}
