use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{KhataError, Result};
use crate::model::{Expense, SaleRecord};

/// A dated amount fed into the daily series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedAmount {
    pub id: u32,
    pub date: NaiveDateTime,
    pub amount: f64,
}

impl From<&SaleRecord> for DatedAmount {
    fn from(sale: &SaleRecord) -> Self {
        Self {
            id: sale.id,
            date: sale.date,
            amount: sale.total,
        }
    }
}

impl From<&Expense> for DatedAmount {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            date: expense.date,
            amount: expense.amount,
        }
    }
}

/// One chart row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotals {
    pub day: NaiveDate,
    pub sales: f64,
    pub expenses: f64,
}

impl DayTotals {
    pub fn net(&self) -> f64 {
        self.sales - self.expenses
    }
}

fn bucket(
    kind: &'static str,
    records: &[DatedAmount],
    into: &mut BTreeMap<NaiveDate, f64>,
) -> Result<()> {
    for record in records {
        if !record.amount.is_finite() || record.amount < 0.0 {
            return Err(KhataError::InvalidRecord {
                kind,
                id: record.id,
                amount: record.amount,
            });
        }
        *into.entry(record.date.date()).or_insert(0.0) += record.amount;
    }
    Ok(())
}

/// Sum sales and expenses per calendar day.
///
/// One row per day present in either input, ascending, with 0 for the side
/// that had nothing that day.
pub fn daily_series(sales: &[DatedAmount], expenses: &[DatedAmount]) -> Result<Vec<DayTotals>> {
    let mut sales_by_day = BTreeMap::new();
    let mut expenses_by_day = BTreeMap::new();
    bucket("sale", sales, &mut sales_by_day)?;
    bucket("expense", expenses, &mut expenses_by_day)?;

    let mut days: Vec<NaiveDate> = sales_by_day
        .keys()
        .chain(expenses_by_day.keys())
        .copied()
        .collect();
    days.sort();
    days.dedup();

    Ok(days
        .into_iter()
        .map(|day| DayTotals {
            day,
            sales: sales_by_day.get(&day).copied().unwrap_or(0.0),
            expenses: expenses_by_day.get(&day).copied().unwrap_or(0.0),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(id: u32, when: &str, amount: f64) -> DatedAmount {
        DatedAmount {
            id,
            date: crate::model::parse_date_time(when).unwrap(),
            amount,
        }
    }

    #[test]
    fn same_day_records_are_summed() {
        let rows = daily_series(
            &[at(1, "2024-04-01 09:00", 30.0), at(2, "2024-04-01 21:30", 20.0)],
            &[],
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sales, 50.0);
        assert_eq!(rows[0].expenses, 0.0);
    }

    #[test]
    fn expense_only_day_is_zero_filled() {
        let rows = daily_series(
            &[at(1, "2024-04-02", 80.0)],
            &[at(1, "2024-04-01", 15.0), at(2, "2024-04-02", 5.0)],
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day.to_string(), "2024-04-01");
        assert_eq!((rows[0].sales, rows[0].expenses), (0.0, 15.0));
        assert_eq!((rows[1].sales, rows[1].expenses), (80.0, 5.0));
        assert_eq!(rows[1].net(), 75.0);
    }

    #[test]
    fn invalid_expense_is_reported() {
        let err = daily_series(&[], &[at(3, "2024-04-01", f64::INFINITY)]).unwrap_err();
        assert!(matches!(
            err,
            KhataError::InvalidRecord { kind: "expense", id: 3, .. }
        ));
    }
}
