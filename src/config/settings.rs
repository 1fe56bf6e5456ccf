use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub shop: ShopSettings,
    #[serde(default)]
    pub statement: StatementSettings,
    pub pdf: PdfSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ShopSettings {
    pub currency: String,
    pub currency_symbol: String,
    /// Products at or below this stock count are flagged on the dashboard
    #[serde(default = "default_low_stock")]
    pub low_stock: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatementSettings {
    pub footer: String,
}

impl Default for StatementSettings {
    fn default() -> Self {
        Self {
            footer: "Thank you for your business!".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
    #[serde(default = "default_paper")]
    pub paper: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct LogSettings {
    /// tracing filter directive, e.g. "info" or "khata=debug"
    #[serde(default)]
    pub level: Option<String>,
}

fn default_low_stock() -> u32 {
    5
}

fn default_paper() -> String {
    "a4".to_string()
}
