use log::*;
use pos_common::Money;
use pos_order_engine::{db_types::{NewProduct, Product}, CatalogManagement, OrderLedgerDatabase, SqliteDatabase};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub struct TestStore {
    pub db: SqliteDatabase,
    pub url: String,
}

impl TestStore {
    /// Creates a freshly migrated database in the system temp directory.
    pub async fn new() -> Self {
        dotenvy::from_filename(".env.test").ok();
        let _ = env_logger::try_init();
        let path = std::env::temp_dir().join(format!("pos_it_store_{}.db", rand::random::<u64>()));
        let url = format!("sqlite://{}", path.display());
        Sqlite::create_database(&url).await.expect("Error creating database");
        let db = SqliteDatabase::new_with_url(&url, 8).await.expect("Error connecting to database");
        db.run_migrations().await.expect("Error running DB migrations");
        debug!("🚀️ Test database ready at {url}");
        Self { db, url }
    }

    pub async fn product(&self, name: &str, cents: i64, stock: i64) -> Product {
        self.db.insert_product(NewProduct::new(name, Money::from_cents(cents), stock)).await.expect("Error seeding product")
    }

    pub async fn stock_of(&self, product: &Product) -> i64 {
        self.db.fetch_product(product.id).await.unwrap().expect("product exists").stock
    }

    pub async fn teardown(mut self) {
        let _ = self.db.close().await;
        if let Err(e) = Sqlite::drop_database(&self.url).await {
            warn!("🚀️ Could not remove {}: {e}", self.url);
        }
    }
}
