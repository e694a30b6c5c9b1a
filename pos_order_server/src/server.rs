use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use pos_order_engine::{
    events::StatusEventBus,
    CatalogApi,
    CatalogManagement,
    OrderLedgerDatabase,
    OrderLifecycleApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        welcome,
        CreateProductRoute,
        DeleteProductRoute,
        ListCategoriesRoute,
        ListProductsRoute,
        LiveUpdatesRoute,
        OrderByIdRoute,
        OrdersForTableRoute,
        ProductByIdRoute,
        SubmitOrderRoute,
        UpdateOrderStatusRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let mut db = SqliteDatabase::new_with_options(&config.database_url, config.database_options()).await?;
    if config.run_migrations {
        db.run_migrations().await?;
        info!("🗃️ Database migrations applied to {}", db.url());
    }
    let bus = StatusEventBus::new(config.subscriber_queue_size);
    let srv = create_server_instance(config, db.clone(), bus.clone())?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("💻️ Server stopped. Closing live update sessions.");
    bus.shutdown();
    if let Err(e) = db.close().await {
        warn!("🗃️ Could not close the database cleanly. {e}");
    }
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    bus: StatusEventBus,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let catalog_api = CatalogApi::new(db.clone());
        let lifecycle_api = OrderLifecycleApi::new(db.clone(), bus.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pos::access_log"))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(lifecycle_api))
            .app_data(web::Data::new(bus.clone()))
            .configure(configure_app::<SqliteDatabase>)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Reports malformed request bodies and paths as JSON errors with a 400 status.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default().error_handler(|err, _req| ServerError::InvalidRequestPath(err.to_string()).into()),
    );
}

/// Registers the extractor error handlers and every route.
///
/// `/orders/updates` is registered ahead of `/orders/{id}` so that it is never treated as an order id.
pub fn configure_app<B>(cfg: &mut web::ServiceConfig)
where B: OrderLedgerDatabase + CatalogManagement + 'static {
    configure_extractors(cfg);
    cfg.service(welcome)
    .service(health)
    .service(ListProductsRoute::<B>::new())
    .service(CreateProductRoute::<B>::new())
    .service(ProductByIdRoute::<B>::new())
    .service(UpdateProductRoute::<B>::new())
    .service(DeleteProductRoute::<B>::new())
    .service(ListCategoriesRoute::<B>::new())
    .service(LiveUpdatesRoute::<B>::new())
    .service(SubmitOrderRoute::<B>::new())
    .service(OrdersForTableRoute::<B>::new())
    .service(OrderByIdRoute::<B>::new())
    .service(UpdateOrderStatusRoute::<B>::new());
}
