use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Order, OrderId, OrderItem, OrderStatusType, PricedOrderItem},
    traits::StatusChange,
};

const ORDER_COLUMNS: &str = "id, table_no, total, status, created_at, updated_at";

/// Inserts a new order header with `pending` status and returns its id. This is not atomic. Embed this call inside a
/// transaction together with [`insert_order_items`], and pass `&mut tx` as the connection argument.
pub async fn insert_order(
    table_no: &str,
    total: pos_common::Money,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<OrderId, SqliteDatabaseError> {
    let id: OrderId = sqlx::query_scalar(
        r#"
            INSERT INTO orders (table_no, total, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id;
        "#,
    )
    .bind(table_no)
    .bind(total)
    .bind(OrderStatusType::Pending)
    .bind(now)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Order header {id} inserted for table {table_no}");
    Ok(id)
}

/// Inserts one line item per entry in `items`, in the given order.
pub async fn insert_order_items(
    order_id: OrderId,
    items: &[PricedOrderItem],
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    if items.is_empty() {
        return Err(SqliteDatabaseError::QueryError(format!("Order {order_id} has no line items to insert")));
    }
    let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO order_items (order_id, product_id, quantity, unit_price) ");
    builder.push_values(items, |mut row, item| {
        row.push_bind(order_id).push_bind(item.product_id).push_bind(item.quantity).push_bind(item.unit_price);
    });
    let result = builder.build().execute(conn).await?;
    trace!("🗃️ {} line items inserted for order {order_id}", result.rows_affected());
    Ok(())
}

pub async fn fetch_items_for_order(
    order_id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, SqliteDatabaseError> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, quantity, unit_price FROM order_items WHERE order_id = $1 ORDER BY id ASC",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Returns the order with the given id, along with its line items.
pub async fn fetch_order_by_id(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(&mut *conn).await?;
    match order {
        Some(order) => with_items(order, conn).await.map(Some),
        None => Ok(None),
    }
}

/// Fetches every order for a table, newest first, along with their line items.
pub async fn fetch_orders_for_table(
    table_no: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE table_no = $1 ORDER BY id DESC");
    let orders = sqlx::query_as::<_, Order>(&sql).bind(table_no).fetch_all(&mut *conn).await?;
    trace!("🗃️ {} orders found for table {table_no}", orders.len());
    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        result.push(with_items(order, conn).await?);
    }
    Ok(result)
}

async fn with_items(mut order: Order, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    order.items = fetch_items_for_order(order.id, conn).await?;
    Ok(order)
}

/// Checks whether the order with the given id exists.
pub async fn order_exists(id: OrderId, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1)").bind(id).fetch_one(conn).await?;
    Ok(exists)
}

/// Sets the status of a single order, provided it still has the expected previous status.
///
/// Returns the updated order (with items), or `None` if no row had the expected id and status.
pub(crate) async fn update_order_status(
    change: StatusChange,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!(
        "UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4 RETURNING {ORDER_COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(change.to)
        .bind(change.at)
        .bind(change.order_id)
        .bind(change.from)
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        Some(order) => {
            debug!("🗃️ Order {} moved from {} to {}", change.order_id, change.from, change.to);
            with_items(order, conn).await.map(Some)
        },
        None => Ok(None),
    }
}
