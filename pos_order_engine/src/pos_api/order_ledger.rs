use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order},
    traits::{OrderFlowError, OrderLedgerDatabase},
};

/// The `OrderLedger` turns a client's order request into a committed order, or rejects it without side effects.
///
/// Prices are never taken from the request. Every line is priced from the catalog inside the committing transaction.
#[derive(Clone)]
pub struct OrderLedger<B> {
    db: B,
}

impl<B: Debug> Debug for OrderLedger<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderLedger ({:?})", self.db)
    }
}

impl<B> OrderLedger<B>
where B: OrderLedgerDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Validates `order` and commits it, together with its stock decrements, as one atomic unit.
    ///
    /// Malformed requests fail with `InvalidInput` before the store is touched. See
    /// [`OrderLedgerDatabase::commit_order`] for the remaining failure modes.
    pub async fn commit(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        if let Err(e) = order.validate() {
            debug!("🧾️ Order for table '{}' rejected. {e}", order.table_no);
            return Err(e.into());
        }
        let table_no = order.table_no.clone();
        let item_count = order.items.len();
        match self.db.commit_order(order).await {
            Ok(order) => {
                info!("🧾️ Order {} committed for table {table_no}. {item_count} items, total {}", order.id, order.total);
                Ok(order)
            },
            Err(e @ OrderFlowError::StoreUnavailable(_)) => {
                error!("🧾️ Could not commit order for table {table_no}. {e}");
                Err(e)
            },
            Err(e) => {
                debug!("🧾️ Order for table {table_no} rejected. {e}");
                Err(e)
            },
        }
    }
}
