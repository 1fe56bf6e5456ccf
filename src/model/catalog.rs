use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Category {
    pub id: u32,
    pub name: String,
    /// Default selling unit for products in this category (e.g. "piece", "kg")
    pub unit: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Product {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub unit: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub featured: bool,
    pub created: NaiveDateTime,
}

fn default_available() -> bool {
    true
}
