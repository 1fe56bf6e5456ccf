use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{KhataError, Result};

/// Where an order stands in the kitchen-to-customer flow
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivered and cancelled orders are final
    pub fn is_closed(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    #[default]
    Takeaway,
    Delivery,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::DineIn => write!(f, "dine-in"),
            OrderType::Takeaway => write!(f, "takeaway"),
            OrderType::Delivery => write!(f, "delivery"),
        }
    }
}

/// One product line, priced when the order was placed
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: u32,
    pub product_name: String,
    pub unit: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Order {
    pub id: u32,
    pub number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    pub created: NaiveDateTime,
    pub updated: NaiveDateTime,
}

impl Order {
    pub fn is_for(&self, phone: &str) -> bool {
        self.customer_phone == phone
    }
}

/// "ORD-20240105-0007"
pub fn order_number(id: u32, created: NaiveDateTime) -> String {
    format!("ORD-{}-{id:04}", created.format("%Y%m%d"))
}

/// Parse a `PRODUCT_ID:QUANTITY` order line
pub fn parse_order_item(input: &str) -> Result<(u32, u32)> {
    let invalid = || KhataError::InvalidItem(input.to_string());
    let (product, quantity) = input.trim().split_once(':').ok_or_else(invalid)?;
    let product = product.trim().parse().map_err(|_| invalid())?;
    let quantity = quantity.trim().parse().map_err(|_| invalid())?;
    Ok((product, quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_date_time;

    #[test]
    fn order_numbers_carry_day_and_id() {
        let created = parse_date_time("2024-01-05 18:30").unwrap();
        assert_eq!(order_number(7, created), "ORD-20240105-0007");
    }

    #[test]
    fn order_items_parse_as_id_and_quantity() {
        assert_eq!(parse_order_item("3:2").unwrap(), (3, 2));
        assert_eq!(parse_order_item(" 12 : 1 ").unwrap(), (12, 1));
        for bad in ["3", "3:", "x:2", "3:-1", ""] {
            assert!(
                matches!(parse_order_item(bad), Err(KhataError::InvalidItem(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn only_delivered_and_cancelled_are_closed() {
        assert!(OrderStatus::Delivered.is_closed());
        assert!(OrderStatus::Cancelled.is_closed());
        assert!(!OrderStatus::Ready.is_closed());
        assert!(!OrderStatus::default().is_closed());
    }

    #[test]
    fn order_type_uses_kebab_case() {
        #[derive(Serialize)]
        struct Wrapper {
            kind: OrderType,
        }
        let text = toml::to_string(&Wrapper {
            kind: OrderType::DineIn,
        })
        .unwrap();
        assert_eq!(text.trim(), "kind = \"dine-in\"");
    }
}
