use actix_web::{http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use pos_common::Money;
use pos_order_engine::{
    db_types::{Category, NewProduct, Product, ProductId},
    CatalogApi,
    OrderFlowError,
};

use super::{helpers::send, mocks::MockCatalogManager};
use crate::{
    routes::{CreateProductRoute, DeleteProductRoute, ListCategoriesRoute, ListProductsRoute, ProductByIdRoute},
    server::configure_extractors,
};

fn coffee() -> Product {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    Product {
        id: ProductId(1),
        name: "Coffee".into(),
        price: Money::from_cents(350),
        stock: 40,
        is_available: true,
        category_id: Some(1),
        image_url: None,
        created_at: at,
        updated_at: at,
    }
}

fn configure(mock: MockCatalogManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        configure_extractors(cfg);
        cfg.app_data(web::Data::new(CatalogApi::new(mock)))
            .service(ListProductsRoute::<MockCatalogManager>::new())
            .service(CreateProductRoute::<MockCatalogManager>::new())
            .service(ProductByIdRoute::<MockCatalogManager>::new())
            .service(DeleteProductRoute::<MockCatalogManager>::new())
            .service(ListCategoriesRoute::<MockCatalogManager>::new());
    }
}

#[actix_web::test]
async fn list_products() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_fetch_products().returning(|| Ok(vec![coffee()]));
    let app = test::init_service(App::new().configure(configure(mock))).await;
    let (status, body) = send(&app, TestRequest::get().uri("/products").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    let products: Vec<Product> = serde_json::from_str(&body).unwrap();
    assert_eq!(products, vec![coffee()]);
}

#[actix_web::test]
async fn missing_product_is_404() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_fetch_product().withf(|id| *id == ProductId(99)).returning(|_| Ok(None));
    let app = test::init_service(App::new().configure(configure(mock))).await;
    let (status, body) = send(&app, TestRequest::get().uri("/products/99").to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("\"error\""), "{body}");
}

#[actix_web::test]
async fn non_numeric_product_id_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mock = MockCatalogManager::new();
    let app = test::init_service(App::new().configure(configure(mock))).await;
    let (status, body) = send(&app, TestRequest::get().uri("/products/coffee").to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Could not read request path"), "{body}");
}

#[actix_web::test]
async fn invalid_products_never_reach_the_store() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_insert_product().never();
    let app = test::init_service(App::new().configure(configure(mock))).await;
    let product = NewProduct::new("  ", Money::from_cents(100), 5);
    let req = TestRequest::post().uri("/products").set_json(&product).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("name"), "{body}");
}

#[actix_web::test]
async fn malformed_product_body_is_400() {
    let _ = env_logger::try_init().ok();
    let mock = MockCatalogManager::new();
    let app = test::init_service(App::new().configure(configure(mock))).await;
    let req = TestRequest::post()
        .uri("/products")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"name": "Tea"}"#)
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Could not read request body"), "{body}");
}

#[actix_web::test]
async fn create_product() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_insert_product().times(1).returning(|p| Ok(Product { name: p.name, price: p.price, ..coffee() }));
    let app = test::init_service(App::new().configure(configure(mock))).await;
    let product = NewProduct::new("Coffee", Money::from_cents(350), 40);
    let req = TestRequest::post().uri("/products").set_json(&product).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Product = serde_json::from_str(&body).unwrap();
    assert_eq!(created.price, Money::from_cents(350));
}

#[actix_web::test]
async fn ordered_products_cannot_be_deleted() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_delete_product().returning(|id| Err(OrderFlowError::ProductInUse(id)));
    let app = test::init_service(App::new().configure(configure(mock))).await;
    let (status, _) = send(&app, TestRequest::delete().uri("/products/1").to_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn list_categories() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_fetch_categories().returning(|| Ok(vec![Category { id: 1, name: "Drinks".into() }]));
    let app = test::init_service(App::new().configure(configure(mock))).await;
    let (status, body) = send(&app, TestRequest::get().uri("/categories").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"[{"id":1,"name":"Drinks"}]"#);
}
