use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BusinessInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub gstin: Option<String>,
}
