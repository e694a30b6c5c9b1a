use thiserror::Error;

use crate::db_types::{OrderId, OrderStatusType, ProductId, ValidationError};

/// Every failure the order engine reports to its callers.
///
/// No variant is ever returned after a partial mutation: whenever one of these comes back, the store looks exactly as
/// it did before the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderFlowError {
    #[error("Invalid input. {0}")]
    InvalidInput(String),
    #[error("Product {0} does not exist or is not available")]
    UnknownProduct(ProductId),
    #[error("Product {product_id} is out of stock. Requested {requested}, but only {available} left")]
    OutOfStock { product_id: ProductId, requested: i64, available: i64 },
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("Product {0} is referenced by existing orders and cannot be deleted")]
    ProductInUse(ProductId),
    #[error("The order store is unavailable. {0}")]
    StoreUnavailable(String),
}

impl OrderFlowError {
    /// Only infrastructure faults are worth retrying. Business-rule rejections will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<ValidationError> for OrderFlowError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidInput(e.0)
    }
}

/// Constraint violations are caused by the request itself and will never succeed on retry.
impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db)
                if db.is_foreign_key_violation() || db.is_check_violation() || db.is_unique_violation() =>
            {
                Self::InvalidInput(db.message().to_string())
            },
            _ => Self::StoreUnavailable(e.to_string()),
        }
    }
}
