use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Expense {
    pub id: u32,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDateTime,
}
