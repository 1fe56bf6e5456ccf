pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod pdf;
pub mod session;
pub mod store;

pub use config::{Config, GlobalConfig};
pub use error::{KhataError, Result};
pub use ledger::{build_customer_ledger, build_ledger, customer_balance, Ledger, LedgerEntry};
pub use session::Session;
pub use store::Store;
