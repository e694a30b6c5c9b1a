use chrono::{DateTime, Utc};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    traits::OrderFlowError,
};

/// A status change request for a single order, applied only if the order still has the `from` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: OrderId,
    pub from: OrderStatusType,
    pub to: OrderStatusType,
    pub at: DateTime<Utc>,
}

/// This trait defines the transactional behaviour that backends supporting the order engine must provide.
///
/// This behaviour includes:
/// * Committing new orders atomically against the catalog's stock levels
/// * Applying order status changes
/// * Querying orders and their line items
#[allow(async_fn_in_trait)]
pub trait OrderLedgerDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a validated new order, and in a single atomic transaction,
    /// * reads the current price and stock of every referenced product, claiming those rows against concurrent
    ///   commits,
    /// * checks that every product exists, is available and has enough stock,
    /// * decrements the stock of every product,
    /// * computes the order total from the prices that were read,
    /// * inserts the order header with `pending` status,
    /// * inserts one line item per requested item, with the read price as its unit price.
    ///
    /// Either all of the above happen, or none of them do. Returns the committed order including its items.
    ///
    /// Errors:
    /// * `UnknownProduct` if a product does not exist or is unavailable.
    /// * `OutOfStock` if a product does not have enough stock.
    /// * `StoreUnavailable` if the transaction could not be started or committed, including lock waits that exceed the
    ///   configured timeout. The call is safe to retry.
    async fn commit_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    /// Fetches the order with the given id, including its line items.
    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, OrderFlowError>;

    /// Fetches every order for the given table, newest first, including their line items.
    async fn fetch_orders_for_table(&self, table_no: &str) -> Result<Vec<Order>, OrderFlowError>;

    /// Atomically moves a single order from `change.from` to `change.to`.
    ///
    /// Returns the updated order, or `None` if the order no longer has the `from` status (another writer got there
    /// first). Returns `OrderFlowError::OrderNotFound` if the order does not exist.
    async fn update_order_status(&self, change: StatusChange) -> Result<Option<Order>, OrderFlowError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}
