use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use pos_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------       ProductId       -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl ProductId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------        OrderId        -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------       Category        -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

//--------------------------------------        Product        -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// The current catalog price. Orders snapshot this value when they are committed.
    pub price: Money,
    pub stock: i64,
    pub is_available: bool,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewProduct      -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_available() -> bool {
    true
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Money, stock: i64) -> Self {
        Self { name: name.into(), price, stock, is_available: true, category_id: None, image_url: None }
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_image_url<S: Into<String>>(mut self, url: S) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    /// Checks the catalog invariants: a non-empty name, a non-negative price and non-negative stock.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError("Product name cannot be empty".into()));
        }
        check_price_and_stock(Some(self.price), Some(self.stock))
    }
}

//--------------------------------------     ProductUpdate     -------------------------------------------------------
/// The fields of a product that may be changed through the catalog. `None` leaves the field untouched.
///
/// Setting `stock` is an administrative overwrite (e.g. a restock), not an order decrement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
    pub is_available: Option<bool>,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
}

impl ProductUpdate {
    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = Some(is_available);
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() &&
            self.price.is_none() &&
            self.stock.is_none() &&
            self.is_available.is_none() &&
            self.category_id.is_none() &&
            self.image_url.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err(ValidationError("Product name cannot be empty".into()));
        }
        check_price_and_stock(self.price, self.stock)
    }
}

fn check_price_and_stock(price: Option<Money>, stock: Option<i64>) -> Result<(), ValidationError> {
    if let Some(price) = price.filter(Money::is_negative) {
        return Err(ValidationError(format!("Price cannot be negative ({price})")));
    }
    if let Some(stock) = stock.filter(|s| *s < 0) {
        return Err(ValidationError(format!("Stock cannot be negative ({stock})")));
    }
    Ok(())
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been committed and is waiting for the kitchen.
    Pending,
    /// The kitchen has started on the order.
    Preparing,
    /// The order is ready to be taken to the table.
    Ready,
    /// The order has been delivered to the table.
    Served,
    /// The order was cancelled before it was ready.
    Cancelled,
}

impl OrderStatusType {
    /// Whether the order lifecycle permits moving from `self` to `next`.
    ///
    /// | From \ To | Pending | Preparing | Ready | Served | Cancelled |
    /// |-----------|---------|-----------|-------|--------|-----------|
    /// | Pending   |         | ✔         |       |        | ✔         |
    /// | Preparing |         |           | ✔     |        | ✔         |
    /// | Ready     |         |           |       | ✔      |           |
    /// | Served    |         |           |       |        |           |
    /// | Cancelled |         |           |       |        |           |
    pub fn can_transition_to(self, next: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!((self, next), (Pending, Preparing) | (Preparing, Ready) | (Ready, Served) | (Pending | Preparing, Cancelled))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::Pending => "pending",
            OrderStatusType::Preparing => "preparing",
            OrderStatusType::Ready => "ready",
            OrderStatusType::Served => "served",
            OrderStatusType::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "served" => Ok(Self::Served),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------       OrderItem       -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// The catalog price at the moment the order was committed.
    pub unit_price: Money,
}

//--------------------------------------         Order         -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub table_no: String,
    pub total: Money,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
/// An order as submitted by a client. Only product ids and quantities are accepted; prices always come from the
/// catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub table_no: String,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl NewOrderItem {
    pub fn new<P: Into<ProductId>>(product_id: P, quantity: i64) -> Self {
        Self { product_id: product_id.into(), quantity }
    }
}

impl NewOrder {
    pub fn new<S: Into<String>>(table_no: S, items: Vec<NewOrderItem>) -> Self {
        Self { table_no: table_no.into(), items }
    }

    /// Rejects requests that can never succeed, before any storage is touched.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.table_no.trim().is_empty() {
            return Err(ValidationError("Table number cannot be empty".into()));
        }
        if self.items.is_empty() {
            return Err(ValidationError("An order must contain at least one item".into()));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity <= 0) {
            return Err(ValidationError(format!(
                "Quantity for product {} must be positive, got {}",
                item.product_id, item.quantity
            )));
        }
        Ok(())
    }
}

//--------------------------------------    PricedOrderItem    -------------------------------------------------------
/// A line item whose price has been read from the catalog inside the committing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedOrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}
