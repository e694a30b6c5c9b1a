use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    events::{SessionHandle, SessionManager, StatusEvent, StatusEventBus, Transport},
    pos_api::order_ledger::OrderLedger,
    traits::{OrderFlowError, OrderLedgerDatabase, StatusChange},
};

/// `OrderLifecycleApi` is the primary API for order intake and kitchen workflow.
///
/// Every successful commit or status change is published as a [`StatusEvent`] to all live-view subscribers. Publishing
/// happens after the change is durable and can never fail the caller's request.
#[derive(Clone)]
pub struct OrderLifecycleApi<B> {
    ledger: OrderLedger<B>,
    sessions: SessionManager,
}

impl<B: Debug> Debug for OrderLifecycleApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderLifecycleApi ({:?}, {:?})", self.ledger, self.sessions.bus())
    }
}

impl<B> OrderLifecycleApi<B>
where B: OrderLedgerDatabase
{
    pub fn new(db: B, bus: StatusEventBus) -> Self {
        Self { ledger: OrderLedger::new(db), sessions: SessionManager::new(bus) }
    }

    pub fn bus(&self) -> &StatusEventBus {
        self.sessions.bus()
    }

    pub fn db(&self) -> &B {
        self.ledger.db()
    }

    /// Commits a new order and announces it as `pending`.
    pub async fn submit_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let order = self.ledger.commit(order).await?;
        self.announce(&order);
        Ok(order)
    }

    /// Moves an order to `new_status`, if the lifecycle allows it, and announces the change.
    ///
    /// Errors:
    /// * `OrderNotFound` if there is no such order.
    /// * `InvalidTransition` if the order's current status cannot move to `new_status`. This includes losing a race
    ///   against a concurrent change to the same order. Nothing is published in that case.
    /// * `StoreUnavailable` if the change could not be persisted.
    pub async fn transition_status(&self, order_id: OrderId, new_status: OrderStatusType) -> Result<Order, OrderFlowError> {
        let current = self.fetch_order(order_id).await?;
        if !current.status.can_transition_to(new_status) {
            debug!("🔄️ Order {order_id} cannot move from {} to {new_status}", current.status);
            return Err(OrderFlowError::InvalidTransition { order_id, from: current.status, to: new_status });
        }
        // Events for one order must carry non-decreasing timestamps, even if the clock steps backwards.
        let at = Utc::now().max(current.updated_at);
        let change = StatusChange { order_id, from: current.status, to: new_status, at };
        match self.db().update_order_status(change).await? {
            Some(order) => {
                info!("🔄️ Order {order_id} for table {} is now {new_status}", order.table_no);
                self.announce(&order);
                Ok(order)
            },
            None => {
                let latest = self.fetch_order(order_id).await?;
                warn!(
                    "🔄️ Order {order_id} changed to {} while it was being moved from {} to {new_status}",
                    latest.status, current.status
                );
                Err(OrderFlowError::InvalidTransition { order_id, from: latest.status, to: new_status })
            },
        }
    }

    /// Attaches a live-view subscriber. It receives every status event published from now on, until the transport
    /// closes or [`Self::unsubscribe`] is called.
    pub fn subscribe_to_live_updates<T>(&self, transport: T) -> SessionHandle
    where T: Transport + Send + 'static {
        self.sessions.attach(transport)
    }

    pub fn unsubscribe(&self, handle: &SessionHandle) {
        self.sessions.detach(handle);
    }

    pub async fn fetch_order(&self, order_id: OrderId) -> Result<Order, OrderFlowError> {
        self.db().fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))
    }

    /// Fetches every order placed for a table, newest first.
    pub async fn orders_for_table(&self, table_no: &str) -> Result<Vec<Order>, OrderFlowError> {
        let table_no = table_no.trim();
        if table_no.is_empty() {
            return Err(OrderFlowError::InvalidInput("Table number cannot be empty".into()));
        }
        self.db().fetch_orders_for_table(table_no).await
    }

    fn announce(&self, order: &Order) {
        let event = StatusEvent::for_order(order);
        let receivers = self.bus().publish(event);
        trace!("🔄️ Order {} ({}) announced to {receivers} subscribers", order.id, order.status);
    }
}
