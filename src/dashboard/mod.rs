//! Admin dashboard aggregation: daily sales/expense series, time windows and
//! section summaries.

mod overview;
mod series;
mod window;

pub use overview::{
    customer_balances, revenue_by_category, CategoryRevenue, CustomerBalance, OrderStats,
    Overview, ProductStats, Receivables, Section,
};
pub use series::{daily_series, DatedAmount, DayTotals};
pub use window::{filter_by_name, Window};

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::{Expense, SaleRecord};

/// Build the daily series from raw records and narrow it to a window name.
/// `None` keeps the whole series.
pub fn chart_rows(
    sales: &[SaleRecord],
    expenses: &[Expense],
    window: Option<&str>,
    today: NaiveDate,
) -> Result<Vec<DayTotals>> {
    let sales: Vec<DatedAmount> = sales.iter().map(DatedAmount::from).collect();
    let expenses: Vec<DatedAmount> = expenses.iter().map(DatedAmount::from).collect();
    let rows = daily_series(&sales, &expenses)?;
    Ok(match window {
        Some(name) => filter_by_name(&rows, name, today),
        None => rows,
    })
}
