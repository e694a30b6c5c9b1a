//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! etc.) must be expressed as futures or asynchronous functions.
use actix_web::{get, http::header, web, HttpResponse, Responder};
use log::*;
use pos_order_engine::{
    db_types::{NewOrder, NewProduct, OrderId, ProductId, ProductUpdate},
    events::StatusEventBus,
    CatalogApi,
    CatalogManagement,
    OrderLedgerDatabase,
    OrderLifecycleApi,
};

use crate::{
    data_objects::{HealthResponse, JsonResponse, StatusUpdateRequest},
    errors::ServerError,
    sse::{SseTransport, SSE_FRAME_BUFFER},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/")]
pub async fn welcome() -> impl Responder {
    HttpResponse::Ok().json(JsonResponse::success("Welcome to the POS order server"))
}

#[get("/health")]
pub async fn health(bus: web::Data<StatusEventBus>) -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(HealthResponse { status: "ok".into(), live_subscribers: bus.subscriber_count() })
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(list_products => Get "/products" impl CatalogManagement);
pub async fn list_products<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl CatalogManagement);
pub async fn product_by_id<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = ProductId::from(path.into_inner());
    trace!("💻️ GET product {id}");
    let product = api.product(id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(create_product => Post "/products" impl CatalogManagement);
pub async fn create_product<B: CatalogManagement>(
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = body.into_inner();
    debug!("💻️ POST product '{}'", product.name);
    let product = api.create_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Put "/products/{id}" impl CatalogManagement);
pub async fn update_product<B: CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = ProductId::from(path.into_inner());
    debug!("💻️ PUT product {id}");
    let product = api.update_product(id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl CatalogManagement);
pub async fn delete_product<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = ProductId::from(path.into_inner());
    debug!("💻️ DELETE product {id}");
    api.delete_product(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Product {id} deleted"))))
}

route!(list_categories => Get "/categories" impl CatalogManagement);
pub async fn list_categories<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET categories");
    let categories = api.categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(submit_order => Post "/orders" impl OrderLedgerDatabase);
/// Places a new order. Any prices supplied by the client are ignored; lines are priced from the catalog.
pub async fn submit_order<B: OrderLedgerDatabase>(
    body: web::Json<NewOrder>,
    api: web::Data<OrderLifecycleApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order = body.into_inner();
    debug!("💻️ POST order for table '{}' with {} lines", order.table_no, order.items.len());
    let order = api.submit_order(order).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(order_by_id => Get "/orders/{id}" impl OrderLedgerDatabase);
pub async fn order_by_id<B: OrderLedgerDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderLifecycleApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId::from(path.into_inner());
    trace!("💻️ GET order {id}");
    let order = api.fetch_order(id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(orders_for_table => Get "/orders/table/{table_no}" impl OrderLedgerDatabase);
pub async fn orders_for_table<B: OrderLedgerDatabase>(
    path: web::Path<String>,
    api: web::Data<OrderLifecycleApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let table_no = path.into_inner();
    trace!("💻️ GET orders for table {table_no}");
    let orders = api.orders_for_table(&table_no).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order_status => Post "/orders/{id}/status" impl OrderLedgerDatabase);
pub async fn update_order_status<B: OrderLedgerDatabase>(
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderLifecycleApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId::from(path.into_inner());
    let status = body.into_inner().status;
    debug!("💻️ POST order {id} status {status}");
    let order = api.transition_status(id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(live_updates => Get "/orders/updates" impl OrderLedgerDatabase);
/// Streams every order status event, from the moment of connection, as Server-Sent Events.
pub async fn live_updates<B: OrderLedgerDatabase>(api: web::Data<OrderLifecycleApi<B>>) -> HttpResponse {
    let (transport, body) = SseTransport::channel(SSE_FRAME_BUFFER);
    let session = api.subscribe_to_live_updates(transport);
    info!("💻️ Live update stream opened for {}", session.id());
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(body)
}
