use std::fmt::Debug;

use chrono::Utc;
use log::*;
use pos_common::Money;
use sqlx::{migrate, SqlitePool};

use super::{db_url, new_pool, orders, products, DatabaseOptions, SqliteDatabaseError};
use crate::{
    db::sqlite::products::{ProductDeletion, StockAdjustment},
    db_types::{Category, NewOrder, NewProduct, Order, OrderId, PricedOrderItem, Product, ProductId, ProductUpdate},
    traits::{CatalogManagement, OrderFlowError, OrderLedgerDatabase, StatusChange},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderLedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn commit_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut priced = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let product = products::fetch_product_for_update(item.product_id, &mut tx)
                .await?
                .filter(|p| p.is_available)
                .ok_or(OrderFlowError::UnknownProduct(item.product_id))?;
            match products::decrement_stock(item.product_id, item.quantity, now, &mut tx).await? {
                StockAdjustment::Applied => {},
                StockAdjustment::InsufficientStock => {
                    debug!(
                        "🧾️ Order for table {} rejected. Product {} has {} left, {} requested",
                        order.table_no, item.product_id, product.stock, item.quantity
                    );
                    // Dropping the transaction rolls back every decrement made so far.
                    return Err(OrderFlowError::OutOfStock {
                        product_id: item.product_id,
                        requested: item.quantity,
                        available: product.stock,
                    });
                },
            }
            priced.push(PricedOrderItem { product_id: item.product_id, quantity: item.quantity, unit_price: product.price });
        }
        let total = order_total(&priced)?;
        let order_id = orders::insert_order(order.table_no.trim(), total, now, &mut tx).await?;
        orders::insert_order_items(order_id, &priced, &mut tx).await?;
        let committed = orders::fetch_order_by_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| SqliteDatabaseError::QueryError(format!("Order {order_id} vanished before commit")))?;
        tx.commit().await?;
        debug!("🗃️ Order {order_id} for table {} committed with {} items. Total {total}", order.table_no, priced.len());
        Ok(committed)
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_table(&self, table_no: &str) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_table(table_no.trim(), &mut conn).await?;
        Ok(orders)
    }

    async fn update_order_status(&self, change: StatusChange) -> Result<Option<Order>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        if let Some(order) = orders::update_order_status(change, &mut tx).await? {
            tx.commit().await?;
            return Ok(Some(order));
        }
        if orders::order_exists(change.order_id, &mut tx).await? {
            debug!("🗃️ Order {} is no longer {}. Status change skipped.", change.order_id, change.from);
            Ok(None)
        } else {
            Err(OrderFlowError::OrderNotFound(change.order_id))
        }
    }

    async fn close(&mut self) -> Result<(), OrderFlowError> {
        self.pool.close().await;
        Ok(())
    }
}

fn order_total(items: &[PricedOrderItem]) -> Result<Money, OrderFlowError> {
    items.iter().try_fold(Money::default(), |total, item| {
        item.unit_price
            .checked_mul(item.quantity)
            .and_then(|line| total.value().checked_add(line.value()))
            .map(Money::from_cents)
            .ok_or_else(|| OrderFlowError::InvalidInput(format!("Order total overflows at product {}", item.product_id)))
    })
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(&mut conn).await?;
        Ok(products)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let categories = products::fetch_categories(&mut conn).await?;
        Ok(categories)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, OrderFlowError> {
        product.validate()?;
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, Utc::now(), &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, OrderFlowError> {
        update.validate()?;
        let mut tx = self.pool.begin().await?;
        trace!("🗃️ Product {id} updating with new values: {update:?}");
        let product = products::update_product(id, update, Utc::now(), &mut tx).await?;
        tx.commit().await?;
        product.ok_or(OrderFlowError::ProductNotFound(id))
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let outcome = products::delete_product(id, &mut tx).await?;
        match outcome {
            ProductDeletion::Deleted => {
                tx.commit().await?;
                Ok(())
            },
            ProductDeletion::NotFound => Err(OrderFlowError::ProductNotFound(id)),
            ProductDeletion::InUse => Err(OrderFlowError::ProductInUse(id)),
        }
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `POS_DATABASE_URL` and default pool options.
    pub async fn new() -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_options(url.as_str(), DatabaseOptions::default()).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let options = DatabaseOptions::default().with_max_connections(max_connections);
        SqliteDatabase::new_with_options(url, options).await
    }

    pub async fn new_with_options(url: &str, options: DatabaseOptions) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url} and {options:?}");
        let pool = new_pool(url, options).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Adds a product category. Categories are seeded administratively and have no HTTP surface.
    pub async fn insert_category(&self, name: &str) -> Result<Category, SqliteDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let category = products::insert_category(name, &mut tx).await?;
        tx.commit().await?;
        Ok(category)
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
