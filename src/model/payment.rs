use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Money received from a customer against their running balance
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PaymentRecord {
    pub id: u32,
    pub customer_phone: String,
    pub amount: f64,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub note: Option<String>,
}
