use std::path::PathBuf;
use thiserror::Error;

use crate::model::OrderStatus;

#[derive(Error, Debug)]
pub enum KhataError {
    #[error("Config directory not found at {0}. Run 'khata init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Invalid {kind} record #{id}: amount {amount} must be a finite, non-negative number")]
    InvalidRecord {
        kind: &'static str,
        id: u32,
        amount: f64,
    },

    #[error("Unknown window '{0}'. Use today, week, month, lastMonth, halfYear or year.")]
    InvalidWindow(String),

    #[error("Invalid date '{0}'. Use YYYY-MM-DD or YYYY-MM-DD HH:MM.")]
    InvalidDate(String),

    #[error("Amount must be a finite number greater than zero (got {0})")]
    InvalidAmount(f64),

    #[error("Quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),

    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("Customer with phone '{0}' not found")]
    CustomerNotFound(String),

    #[error("User already exists with phone number '{0}'")]
    CustomerExists(String),

    #[error("Product #{0} not found")]
    ProductNotFound(u32),

    #[error("Product '{0}' is not available for sale")]
    ProductUnavailable(String),

    #[error("Not enough stock for '{product}' ({available} left, {requested} requested)")]
    NotEnoughStock {
        product: String,
        available: u32,
        requested: u32,
    },

    #[error("Category '{0}' not found")]
    CategoryNotFound(String),

    #[error("Category '{0}' already exists")]
    CategoryExists(String),

    #[error("Category '{name}' is still used by {count} product(s)")]
    CategoryInUse { name: String, count: usize },

    #[error("Sale #{0} not found")]
    SaleNotFound(u32),

    #[error("Order #{0} not found")]
    OrderNotFound(u32),

    #[error("Order {number} is already {status}")]
    OrderClosed { number: String, status: OrderStatus },

    #[error("Invalid order item '{0}'. Use PRODUCT_ID:QUANTITY, e.g. 3:2")]
    InvalidItem(String),

    #[error("Expense #{0} not found")]
    ExpenseNotFound(u32),

    #[error("Not logged in. Run 'khata login --phone <phone> --password <password>' first.")]
    NotLoggedIn,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Not allowed to access the records of '{0}'")]
    Forbidden(String),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KhataError>;
