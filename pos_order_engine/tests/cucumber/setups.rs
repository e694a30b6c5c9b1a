use cucumber::given;
use pos_common::Money;
use pos_order_engine::{db_types::NewProduct, events::ChannelTransport, CatalogManagement};

use crate::cucumber::{world::OrderSystem, PosWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut PosWorld) {
    let system = OrderSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a product {string} priced at {word} with {int} in stock")]
async fn add_product(world: &mut PosWorld, name: String, price: String, stock: i64) {
    let price: Money = price.parse().expect("Not a valid price");
    let product = world.api().db().insert_product(NewProduct::new(name.clone(), price, stock)).await.expect("Error adding product");
    world.products.insert(name, product);
}

#[given("a live display is connected")]
async fn connect_display(world: &mut PosWorld) {
    let (transport, receiver) = ChannelTransport::channel(32);
    world.api().subscribe_to_live_updates(transport);
    world.display = Some(receiver);
}
