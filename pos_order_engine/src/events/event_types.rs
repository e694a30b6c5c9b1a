use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{Order, OrderId, OrderStatusType};

/// Published exactly once for every successful order commit or status change.
///
/// Serialises as `{"orderId": 1, "tableNo": "T5", "status": "pending", "occurredAt": "2024-06-01T12:00:00Z"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub order_id: OrderId,
    pub table_no: String,
    pub status: OrderStatusType,
    pub occurred_at: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new<S: Into<String>>(
        order_id: OrderId,
        table_no: S,
        status: OrderStatusType,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self { order_id, table_no: table_no.into(), status, occurred_at }
    }

    /// Describes the current state of `order`, as of its last persisted change.
    pub fn for_order(order: &Order) -> Self {
        Self::new(order.id, order.table_no.clone(), order.status, order.updated_at)
    }
}

/// A failure to deliver events to one live-view subscriber. It tears down that subscriber's session and nothing else.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionFault {
    #[error("The subscriber has disconnected")]
    Disconnected,
    #[error("Could not write to the subscriber. {0}")]
    WriteFailed(String),
    #[error("Could not encode the event. {0}")]
    Encoding(String),
}
