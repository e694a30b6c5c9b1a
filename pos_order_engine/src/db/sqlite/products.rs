//! Catalog store accessors.
//!
//! Every function takes a plain connection. None of them are atomic on their own; embed them in a transaction and
//! pass `&mut tx` as the connection when several calls need to succeed or fail together.
//!
//! The `RETURNING` writes hand back their row before SQLite has finished the statement. Callers commit a transaction
//! around them so the write is visible to other connections by the time the row is returned.
use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Category, NewProduct, Product, ProductId, ProductUpdate},
};

const PRODUCT_COLUMNS: &str = "id, name, price, stock, is_available, category_id, image_url, created_at, updated_at";

/// The outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    Applied,
    InsufficientStock,
}

/// The outcome of a product deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductDeletion {
    Deleted,
    NotFound,
    InUse,
}

pub async fn fetch_product(id: ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, SqliteDatabaseError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    let product = sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, SqliteDatabaseError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC");
    let products = sqlx::query_as::<_, Product>(&sql).fetch_all(conn).await?;
    trace!("🗃️ Fetched {} products", products.len());
    Ok(products)
}

pub async fn fetch_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, SqliteDatabaseError> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name ASC").fetch_all(conn).await?;
    Ok(categories)
}

pub async fn insert_category(name: &str, conn: &mut SqliteConnection) -> Result<Category, SqliteDatabaseError> {
    let category = sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(category)
}

pub async fn insert_product(
    product: NewProduct,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Product, SqliteDatabaseError> {
    let sql = format!(
        r#"
            INSERT INTO products (name, price, stock, is_available, category_id, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {PRODUCT_COLUMNS};
        "#
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.is_available)
        .bind(product.category_id)
        .bind(product.image_url)
        .bind(now)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Product {} ({}) added to the catalog", product.id, product.name);
    Ok(product)
}

/// Applies the non-empty fields of `update` to the product. Returns `None` if the product does not exist.
pub async fn update_product(
    id: ProductId,
    update: ProductUpdate,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, SqliteDatabaseError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for product {id}. Update request skipped.");
        return fetch_product(id, conn).await;
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE products SET updated_at = ");
    builder.push_bind(now);
    if let Some(name) = update.name {
        builder.push(", name = ");
        builder.push_bind(name);
    }
    if let Some(price) = update.price {
        builder.push(", price = ");
        builder.push_bind(price);
    }
    if let Some(stock) = update.stock {
        builder.push(", stock = ");
        builder.push_bind(stock);
    }
    if let Some(is_available) = update.is_available {
        builder.push(", is_available = ");
        builder.push_bind(is_available);
    }
    if let Some(category_id) = update.category_id {
        builder.push(", category_id = ");
        builder.push_bind(category_id);
    }
    if let Some(image_url) = update.image_url {
        builder.push(", image_url = ");
        builder.push_bind(image_url);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(format!(" RETURNING {PRODUCT_COLUMNS}"));
    trace!("🗃️ Executing query: {}", builder.sql());
    let product = builder.build_query_as::<Product>().fetch_optional(conn).await?;
    Ok(product)
}

/// Deletes the product, unless any order line refers to it. Orders are never rewritten to make a deletion possible.
pub async fn delete_product(id: ProductId, conn: &mut SqliteConnection) -> Result<ProductDeletion, SqliteDatabaseError> {
    let in_use: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM order_items WHERE product_id = $1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if in_use {
        return Ok(ProductDeletion::InUse);
    }
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(conn).await?;
    if result.rows_affected() == 0 {
        Ok(ProductDeletion::NotFound)
    } else {
        debug!("🗃️ Product {id} removed from the catalog");
        Ok(ProductDeletion::Deleted)
    }
}

/// Reads a product row and claims it for the rest of the current transaction.
///
/// SQLite has no row locks. Touching the row with a write takes the database write lock, so a second transaction
/// doing the same waits on the busy timeout instead of reading a stock level that is about to change. This must be
/// the first statement of the transaction: a transaction that has already read cannot be upgraded to a writer while
/// another writer is active.
pub async fn fetch_product_for_update(
    id: ProductId,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, SqliteDatabaseError> {
    let sql = format!("UPDATE products SET updated_at = updated_at WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
    let product = sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(conn).await?;
    trace!("🗃️ Claimed product {id} for update: {product:?}");
    Ok(product)
}

/// Removes `amount` units from a product's stock, but only if at least that many are left.
pub async fn decrement_stock(
    id: ProductId,
    amount: i64,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<StockAdjustment, SqliteDatabaseError> {
    let result = sqlx::query("UPDATE products SET stock = stock - $1, updated_at = $2 WHERE id = $3 AND stock >= $1")
        .bind(amount)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        Ok(StockAdjustment::InsufficientStock)
    } else {
        trace!("🗃️ Stock for product {id} reduced by {amount}");
        Ok(StockAdjustment::Applied)
    }
}
