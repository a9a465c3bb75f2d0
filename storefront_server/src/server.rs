use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use storefront_engine::{events::EventBroadcaster, CatalogApi, CustomerApi, OrderFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    event_stream::event_stream,
    hooks::create_ops_event_handlers,
    routes::{
        health,
        CancelOrderRoute,
        CreateProductRoute,
        DashboardStatsRoute,
        DeleteProductRoute,
        GetOrdersRoute,
        GetProductRoute,
        ListCustomersRoute,
        ListProductsRoute,
        OrderByIdRoute,
        OrdersByCustomerRoute,
        PlaceOrderRoute,
        RegisterCustomerRoute,
        UpdateOrderStatusRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = if config.database_url.is_empty() {
        SqliteDatabase::new(25).await
    } else {
        SqliteDatabase::new_with_url(&config.database_url, 25).await
    }
    .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let broadcaster = EventBroadcaster::new(config.event_buffer_size);
    let handlers = create_ops_event_handlers();
    let producers = handlers.producers();
    tokio::spawn(handlers.start_handlers());
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone(), broadcaster.clone());
        let catalog_api = CatalogApi::new(db.clone(), broadcaster.clone());
        let customers_api = CustomerApi::new(db.clone());
        // /orders/by-customer must register before /orders/{id} so the literal segment wins
        let api_scope = web::scope("/api")
            .service(PlaceOrderRoute::<SqliteDatabase>::new())
            .service(OrdersByCustomerRoute::<SqliteDatabase>::new())
            .service(GetOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(DashboardStatsRoute::<SqliteDatabase>::new())
            .service(ListProductsRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(GetProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(RegisterCustomerRoute::<SqliteDatabase>::new())
            .service(ListCustomersRoute::<SqliteDatabase>::new())
            .service(event_stream);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sfs::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(customers_api))
            .app_data(web::Data::new(broadcaster.clone()))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
