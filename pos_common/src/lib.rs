//! Value types shared by the order engine and the server.
mod helpers;
mod money;

pub mod op;

pub use helpers::parse_boolean_flag;
pub use money::{Money, MoneyConversionError, CURRENCY_MINOR_UNITS};
