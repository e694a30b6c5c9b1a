use std::time::Duration;

use actix_web::{http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use pos_common::Money;
use pos_order_engine::{
    db_types::{NewOrder, NewOrderItem, NewProduct, Order, OrderStatusType, Product},
    events::StatusEventBus,
    test_utils::prepare_env::{drop_test_database, new_test_database},
    traits::CatalogManagement,
    CatalogApi,
    OrderLifecycleApi,
    SqliteDatabase,
};
use serde_json::json;

use super::helpers::{next_chunk, send};
use crate::{data_objects::HealthResponse, server::configure_app};

fn configure(db: SqliteDatabase, bus: StatusEventBus) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(OrderLifecycleApi::new(db.clone(), bus.clone())))
            .app_data(web::Data::new(CatalogApi::new(db)))
            .app_data(web::Data::new(bus));
        configure_app::<SqliteDatabase>(cfg);
    }
}

async fn seed_product(db: &SqliteDatabase, name: &str, cents: i64, stock: i64) -> Product {
    db.insert_product(NewProduct::new(name, Money::from_cents(cents), stock)).await.expect("Could not seed product")
}

fn order_request(order: &NewOrder) -> TestRequest {
    TestRequest::post().uri("/orders").set_json(order)
}

#[actix_web::test]
async fn submit_and_query_orders() {
    let _ = env_logger::try_init().ok();
    let (db, url) = new_test_database().await;
    let bus = StatusEventBus::default();
    let coffee = seed_product(&db, "Coffee", 350, 10).await;
    let app = test::init_service(App::new().configure(configure(db.clone(), bus.clone()))).await;

    let order = NewOrder::new("5", vec![NewOrderItem::new(coffee.id, 2)]);
    let (status, body) = send(&app, order_request(&order).to_request()).await;
    assert_eq!(status, StatusCode::CREATED);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order.total, Money::from_cents(700));
    assert_eq!(order.status, OrderStatusType::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].unit_price, Money::from_cents(350));

    let order_uri = format!("/orders/{}", order.id.value());
    let (status, body) = send(&app, TestRequest::get().uri(&order_uri).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched, order);

    let (status, body) = send(&app, TestRequest::get().uri("/orders/table/5").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders, vec![order]);

    let product_uri = format!("/products/{}", coffee.id.value());
    let (status, body) = send(&app, TestRequest::get().uri(&product_uri).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    let coffee: Product = serde_json::from_str(&body).unwrap();
    assert_eq!(coffee.stock, 8);

    bus.shutdown();
    drop_test_database(db, &url).await;
}

#[actix_web::test]
async fn rejected_orders_map_to_client_errors() {
    let _ = env_logger::try_init().ok();
    let (db, url) = new_test_database().await;
    let bus = StatusEventBus::default();
    let cake = seed_product(&db, "Cake", 500, 1).await;
    let app = test::init_service(App::new().configure(configure(db.clone(), bus.clone()))).await;

    let order = NewOrder::new("2", vec![NewOrderItem::new(cake.id, 3)]);
    let (status, body) = send(&app, order_request(&order).to_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("out of stock"), "{body}");

    let order = NewOrder::new("2", vec![NewOrderItem::new(9_999, 1)]);
    let (status, _) = send(&app, order_request(&order).to_request()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let order = NewOrder::new("2", vec![]);
    let (status, _) = send(&app, order_request(&order).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::post().uri("/orders").set_json(json!({ "table_no": "2" })).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, TestRequest::get().uri("/orders/424242").to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    bus.shutdown();
    drop_test_database(db, &url).await;
}

#[actix_web::test]
async fn status_transitions() {
    let _ = env_logger::try_init().ok();
    let (db, url) = new_test_database().await;
    let bus = StatusEventBus::default();
    let tea = seed_product(&db, "Tea", 250, 5).await;
    let app = test::init_service(App::new().configure(configure(db.clone(), bus.clone()))).await;
    let order = NewOrder::new("7", vec![NewOrderItem::new(tea.id, 1)]);
    let (_, body) = send(&app, order_request(&order).to_request()).await;
    let order: Order = serde_json::from_str(&body).unwrap();
    let status_uri = format!("/orders/{}/status", order.id.value());

    let req = TestRequest::post().uri(&status_uri).set_json(json!({ "status": "preparing" })).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let updated: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(updated.status, OrderStatusType::Preparing);

    let req = TestRequest::post().uri(&status_uri).set_json(json!({ "status": "pending" })).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("cannot move from preparing to pending"), "{body}");

    let req = TestRequest::post().uri(&status_uri).set_json(json!({ "status": "done" })).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::post().uri("/orders/424242/status").set_json(json!({ "status": "ready" })).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    bus.shutdown();
    drop_test_database(db, &url).await;
}

#[actix_web::test]
async fn live_updates_stream_status_events() {
    let _ = env_logger::try_init().ok();
    let (db, url) = new_test_database().await;
    let bus = StatusEventBus::default();
    let juice = seed_product(&db, "Juice", 400, 5).await;
    let app = test::init_service(App::new().configure(configure(db.clone(), bus.clone()))).await;

    let res = test::call_service(&app, TestRequest::get().uri("/orders/updates").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("content-type").unwrap(), "text/event-stream");
    let mut stream = res.into_body();

    let (status, body) = send(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(health.live_subscribers, 1);

    let order = NewOrder::new("3", vec![NewOrderItem::new(juice.id, 1)]);
    let (_, body) = send(&app, order_request(&order).to_request()).await;
    let order: Order = serde_json::from_str(&body).unwrap();
    let req = TestRequest::post()
        .uri(&format!("/orders/{}/status", order.id.value()))
        .set_json(json!({ "status": "preparing" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let mut statuses = Vec::new();
    for _ in 0..2 {
        let frame = next_chunk(&mut stream, Duration::from_secs(5)).await.expect("No live update received");
        let text = String::from_utf8(frame.to_vec()).unwrap();
        assert!(text.starts_with("data: ") && text.ends_with("\n\n"), "{text}");
        let event: serde_json::Value = serde_json::from_str(text.trim_start_matches("data: ").trim_end()).unwrap();
        assert_eq!(event["orderId"], json!(order.id));
        assert_eq!(event["tableNo"], "3");
        statuses.push(event["status"].as_str().unwrap().to_string());
    }
    assert_eq!(statuses, vec!["pending", "preparing"]);

    bus.shutdown();
    assert_eq!(next_chunk(&mut stream, Duration::from_secs(5)).await, None);
    drop_test_database(db, &url).await;
}
