use std::collections::HashMap;

use cucumber::World;
use log::*;
use pos_order_engine::{
    db_types::{Order, Product},
    events::{StatusEvent, StatusEventBus},
    OrderFlowError,
    OrderLifecycleApi,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};
use tokio::sync::mpsc;

#[derive(Default, Debug, World)]
pub struct PosWorld {
    pub system: Option<OrderSystem>,
    pub products: HashMap<String, Product>,
    pub display: Option<mpsc::Receiver<StatusEvent>>,
    pub last_order: Option<Order>,
    pub last_error: Option<OrderFlowError>,
}

#[derive(Debug)]
pub struct OrderSystem {
    pub db_path: String,
    pub api: OrderLifecycleApi<SqliteDatabase>,
}

impl PosWorld {
    pub fn api(&self) -> &OrderLifecycleApi<SqliteDatabase> {
        &self.system.as_ref().expect("Order system not initialised").api
    }

    pub fn product(&self, name: &str) -> &Product {
        self.products.get(name).unwrap_or_else(|| panic!("Product {name} has not been set up"))
    }

    pub fn order(&self) -> &Order {
        self.last_order.as_ref().expect("No order has been committed yet")
    }
}

impl OrderSystem {
    pub async fn new() -> Self {
        let path = std::env::temp_dir().join(format!("pos_bdd_store_{}.db", rand::random::<u64>()));
        let url = format!("sqlite://{}", path.display());
        if let Err(e) = Sqlite::drop_database(&url).await {
            trace!("🚀️ Nothing to drop at {url}: {e}");
        }
        Sqlite::create_database(&url).await.expect("Error creating database");
        let db = SqliteDatabase::new_with_url(&url, 4).await.expect("Error creating connection to database");
        db.run_migrations().await.expect("Error running DB migrations");
        debug!("🚀️ Created database: {url}");
        let api = OrderLifecycleApi::new(db, StatusEventBus::new(32));
        Self { db_path: url, api }
    }
}
