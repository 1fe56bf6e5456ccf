use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One recorded sale. Product details are copied at sale time so later
/// catalog edits never rewrite history.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SaleRecord {
    pub id: u32,
    pub product_id: u32,
    pub product_name: String,
    pub category: String,
    pub unit: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub date: NaiveDateTime,
}

impl SaleRecord {
    pub fn is_for(&self, phone: &str) -> bool {
        self.customer_phone.as_deref() == Some(phone)
    }
}
