use std::time::Duration;

use cucumber::{then, when};
use pos_common::Money;
use pos_order_engine::{
    db_types::{NewOrder, NewOrderItem, OrderStatusType},
    events::StatusEvent,
    CatalogManagement,
    OrderFlowError,
};
use tokio::time::timeout;

use crate::cucumber::PosWorld;

#[when(expr = "table {word} orders {int} {string}")]
async fn place_order(world: &mut PosWorld, table_no: String, quantity: i64, name: String) {
    let product_id = world.product(&name).id;
    let order = NewOrder::new(table_no, vec![NewOrderItem::new(product_id, quantity)]);
    match world.api().submit_order(order).await {
        Ok(order) => {
            world.last_order = Some(order);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "the kitchen moves the order to {word}")]
async fn move_order(world: &mut PosWorld, status: String) {
    let status: OrderStatusType = status.parse().expect("Not a valid order status");
    let order_id = world.order().id;
    match world.api().transition_status(order_id, status).await {
        Ok(order) => {
            world.last_order = Some(order);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[then(expr = "the order total is {word}")]
async fn check_total(world: &mut PosWorld, total: String) {
    let expected: Money = total.parse().expect("Not a valid amount");
    assert_eq!(world.order().total, expected, "Order total is incorrect");
}

#[then(expr = "the order status is {word}")]
async fn check_status(world: &mut PosWorld, status: String) {
    let expected: OrderStatusType = status.parse().expect("Not a valid order status");
    let stored = world.api().fetch_order(world.order().id).await.expect("Error fetching order");
    assert_eq!(stored.status, expected, "Order status is incorrect");
}

#[then(expr = "{string} has {int} in stock")]
async fn check_stock(world: &mut PosWorld, name: String, stock: i64) {
    let id = world.product(&name).id;
    let product = world.api().db().fetch_product(id).await.expect("Error fetching product").expect("Product is gone");
    assert_eq!(product.stock, stock, "Stock for {name} is incorrect");
}

#[then("the order is rejected as out of stock")]
async fn check_out_of_stock(world: &mut PosWorld) {
    let err = world.last_error.as_ref().expect("The order was not rejected");
    assert!(matches!(err, OrderFlowError::OutOfStock { .. }), "Unexpected error: {err}");
}

#[then("the transition is rejected")]
async fn check_invalid_transition(world: &mut PosWorld) {
    let err = world.last_error.as_ref().expect("The transition was not rejected");
    assert!(matches!(err, OrderFlowError::InvalidTransition { .. }), "Unexpected error: {err}");
}

#[then(expr = "table {word} has no orders")]
async fn check_no_orders(world: &mut PosWorld, table_no: String) {
    let orders = world.api().orders_for_table(&table_no).await.expect("Error fetching orders");
    assert!(orders.is_empty(), "Table {table_no} has {} orders", orders.len());
}

#[then(expr = "the display receives a {word} event for the order")]
async fn check_event(world: &mut PosWorld, status: String) {
    let expected: OrderStatusType = status.parse().expect("Not a valid order status");
    let order_id = world.order().id;
    let event = next_display_event(world, Duration::from_secs(2)).await.expect("No event was received");
    assert_eq!(event.order_id, order_id);
    assert_eq!(event.status, expected);
}

#[then("the display receives no further events")]
async fn check_no_events(world: &mut PosWorld) {
    let event = next_display_event(world, Duration::from_millis(100)).await;
    assert!(event.is_none(), "Unexpected event: {event:?}");
}

async fn next_display_event(world: &mut PosWorld, wait: Duration) -> Option<StatusEvent> {
    let display = world.display.as_mut().expect("No display is connected");
    timeout(wait, display.recv()).await.ok().flatten()
}
