//! Persisted shop records.

mod business;
mod catalog;
mod expense;
mod order;
mod payment;
mod sale;
mod user;

pub use business::BusinessInfo;
pub use catalog::{Category, Product};
pub use expense::Expense;
pub use order::{
    order_number, parse_order_item, Order, OrderItem, OrderStatus, OrderType, PaymentStatus,
};
pub use payment::PaymentRecord;
pub use sale::SaleRecord;
pub use user::{hash_password, Role, User};

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{KhataError, Result};

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a calendar day in `YYYY-MM-DD` form.
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| KhataError::InvalidDate(input.to_string()))
}

/// Parse a record timestamp. A bare day means midnight.
pub fn parse_date_time(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    let day = parse_day(trimmed)?;
    Ok(day.and_time(chrono::NaiveTime::MIN))
}

/// Amounts must be finite and strictly positive at the record-creation boundary.
pub fn validate_amount(amount: f64) -> Result<f64> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(KhataError::InvalidAmount(amount))
    }
}
