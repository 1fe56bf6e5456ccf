use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

use super::DayTotals;
use crate::error::KhataError;

/// A named date range relative to today, used to narrow the chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Today,
    /// Monday-anchored current week
    Week,
    Month,
    LastMonth,
    /// Six months back through today
    HalfYear,
    Year,
}

impl Window {
    pub const ALL: [Window; 6] = [
        Window::Today,
        Window::Week,
        Window::Month,
        Window::LastMonth,
        Window::HalfYear,
        Window::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Window::Today => "today",
            Window::Week => "week",
            Window::Month => "month",
            Window::LastMonth => "lastMonth",
            Window::HalfYear => "halfYear",
            Window::Year => "year",
        }
    }

    /// Half-open `[start, end)` day range of this window
    pub fn range(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let month_start = today.with_day(1).unwrap_or(today);
        match self {
            Window::Today => (today, next_day(today)),
            Window::Week => {
                let back = u64::from(today.weekday().num_days_from_monday());
                let start = today.checked_sub_days(Days::new(back)).unwrap_or(today);
                let end = start.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
                (start, end)
            }
            Window::Month => (month_start, add_months(month_start, 1)),
            Window::LastMonth => {
                let start = month_start
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(NaiveDate::MIN);
                (start, month_start)
            }
            Window::HalfYear => {
                let start = today
                    .checked_sub_months(Months::new(6))
                    .unwrap_or(NaiveDate::MIN);
                (start, next_day(today))
            }
            Window::Year => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                (start, add_months(start, 12))
            }
        }
    }

    pub fn contains(self, day: NaiveDate, today: NaiveDate) -> bool {
        let (start, end) = self.range(today);
        start <= day && day < end
    }

    /// Keep the rows whose day falls inside the window
    pub fn filter(self, rows: &[DayTotals], today: NaiveDate) -> Vec<DayTotals> {
        let (start, end) = self.range(today);
        rows.iter()
            .filter(|row| start <= row.day && row.day < end)
            .cloned()
            .collect()
    }
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}

fn add_months(day: NaiveDate, months: u32) -> NaiveDate {
    day.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Window {
    type Err = KhataError;

    /// Accepts `lastMonth`, `last-month`, `last_month` and any casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Window::ALL
            .into_iter()
            .find(|w| w.name().to_lowercase() == key)
            .ok_or_else(|| KhataError::InvalidWindow(s.to_string()))
    }
}

/// Filter by a window name. An unknown name leaves the series unfiltered.
pub fn filter_by_name(rows: &[DayTotals], name: &str, today: NaiveDate) -> Vec<DayTotals> {
    match name.parse::<Window>() {
        Ok(window) => window.filter(rows, today),
        Err(e) => {
            tracing::warn!(error = %e, "showing the whole series");
            rows.to_vec()
        }
    }
}
