use chrono::NaiveDate;
use serde::Serialize;

use super::{EntryKind, LedgerPeriod};
use crate::config::Config;
use crate::model::{BusinessInfo, SaleRecord, User};

const DISPLAY_DATE: &str = "%d %b %Y";

/// Balances under half a paisa count as settled
const SETTLED: f64 = 0.005;

/// "Dr" when the customer owes the shop, "Cr" when they paid in advance
pub fn balance_label(balance: f64) -> &'static str {
    if balance > SETTLED {
        "Dr"
    } else if balance < -SETTLED {
        "Cr"
    } else {
        ""
    }
}

#[derive(Debug, Serialize)]
pub struct StatementRow {
    pub date: String,
    pub details: String,
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    pub balance: f64,
    pub balance_label: String,
}

/// Everything the statement template needs
#[derive(Debug, Serialize)]
pub struct StatementData {
    pub business: BusinessInfo,
    pub customer_name: String,
    pub customer_phone: String,
    pub period: String,
    pub opening_balance: f64,
    pub opening_label: String,
    pub total_debit: f64,
    pub total_credit: f64,
    pub closing_balance: f64,
    pub closing_label: String,
    pub rows: Vec<StatementRow>,
    pub currency_symbol: String,
    pub generated_date: String,
    pub footer: String,
    pub paper: String,
}

impl StatementData {
    /// `from`/`to` default to the first entry's day and `today`.
    pub fn new(
        business: BusinessInfo,
        customer: &User,
        period: &LedgerPeriod<'_>,
        (from, to): (Option<NaiveDate>, Option<NaiveDate>),
        config: &Config,
        today: NaiveDate,
    ) -> Self {
        let first_day = period.entries.first().map(|e| e.date.date());
        let from = from.or(first_day).unwrap_or(today);
        let to = to.unwrap_or(today);

        let rows = period
            .entries
            .iter()
            .map(|e| StatementRow {
                date: e.date.format(DISPLAY_DATE).to_string(),
                details: e.description.clone(),
                debit: (e.kind == EntryKind::Debit).then_some(e.debit),
                credit: (e.kind == EntryKind::Credit).then_some(e.credit),
                balance: e.balance.abs(),
                balance_label: balance_label(e.balance).to_string(),
            })
            .collect();

        Self {
            business,
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            period: format!("{} - {}", from.format(DISPLAY_DATE), to.format(DISPLAY_DATE)),
            opening_balance: period.opening_balance.abs(),
            opening_label: balance_label(period.opening_balance).to_string(),
            total_debit: period.total_debit,
            total_credit: period.total_credit,
            closing_balance: period.closing_balance.abs(),
            closing_label: balance_label(period.closing_balance).to_string(),
            rows,
            currency_symbol: config.shop.currency_symbol.clone(),
            generated_date: today.format(DISPLAY_DATE).to_string(),
            footer: config.statement.footer.clone(),
            paper: config.pdf.paper.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BillLine {
    pub description: String,
    pub quantity: u32,
    pub unit: String,
    pub unit_price: f64,
    pub amount: f64,
}

/// A printable bill for one sale
#[derive(Debug, Serialize)]
pub struct BillData {
    pub business: BusinessInfo,
    pub number: String,
    pub date: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub lines: Vec<BillLine>,
    pub total: f64,
    /// Size of the customer's balance excluding this sale; `None` for
    /// walk-in sales. The direction is in `previous_label`.
    pub previous_balance: Option<f64>,
    pub previous_label: Option<String>,
    pub previous_status: Option<String>,
    pub currency_symbol: String,
    pub footer: String,
    pub paper: String,
}

impl BillData {
    pub fn new(
        business: BusinessInfo,
        sale: &SaleRecord,
        previous_balance: Option<f64>,
        config: &Config,
    ) -> Self {
        let previous_status = previous_balance.map(|balance| {
            if balance > SETTLED {
                "Not Completed".to_string()
            } else {
                "Completed".to_string()
            }
        });

        Self {
            business,
            number: bill_number(sale.id),
            date: sale.date.format(DISPLAY_DATE).to_string(),
            customer_name: sale
                .customer_name
                .clone()
                .unwrap_or_else(|| "Walk-in customer".to_string()),
            customer_phone: sale.customer_phone.clone(),
            lines: vec![BillLine {
                description: sale.product_name.clone(),
                quantity: sale.quantity,
                unit: sale.unit.clone(),
                unit_price: sale.unit_price,
                amount: sale.total,
            }],
            total: sale.total,
            previous_balance: previous_balance.map(f64::abs),
            previous_label: previous_balance.map(|b| balance_label(b).to_string()),
            previous_status,
            currency_symbol: config.shop.currency_symbol.clone(),
            footer: config.statement.footer.clone(),
            paper: config.pdf.paper.clone(),
        }
    }
}

pub fn bill_number(sale_id: u32) -> String {
    format!("BILL-{sale_id:05}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_sign() {
        assert_eq!(balance_label(60.0), "Dr");
        assert_eq!(balance_label(-10.0), "Cr");
        assert_eq!(balance_label(0.001), "");
    }

    #[test]
    fn bill_numbers_are_zero_padded() {
        assert_eq!(bill_number(42), "BILL-00042");
    }

    use crate::ledger::build_ledger;
    use crate::model::{parse_date_time, PaymentRecord, Role};

    fn config() -> Config {
        toml::from_str(crate::config::CONFIG_TEMPLATE).unwrap()
    }

    fn business() -> BusinessInfo {
        BusinessInfo {
            name: "Sharma Kulfi".to_string(),
            address: "Station Road".to_string(),
            phone: "+91-98765-43210".to_string(),
            gstin: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn customer() -> User {
        User {
            id: 2,
            name: "Asha".to_string(),
            phone: "9000000001".to_string(),
            email: "9000000001@example.com".to_string(),
            role: Role::User,
            password_hash: String::new(),
            active: true,
            created: parse_date_time("2024-01-01").unwrap(),
        }
    }

    fn sale(id: u32, date: &str, total: f64, phone: Option<&str>) -> SaleRecord {
        SaleRecord {
            id,
            product_id: 1,
            product_name: "Malai Kulfi".to_string(),
            category: "Kulfi".to_string(),
            unit: "piece".to_string(),
            quantity: 2,
            unit_price: total / 2.0,
            total,
            customer_name: phone.map(|_| "Asha".to_string()),
            customer_phone: phone.map(str::to_string),
            date: parse_date_time(date).unwrap(),
        }
    }

    fn payment(id: u32, date: &str, amount: f64) -> PaymentRecord {
        PaymentRecord {
            id,
            customer_phone: "9000000001".to_string(),
            amount,
            date: parse_date_time(date).unwrap(),
            note: None,
        }
    }

    #[test]
    fn statement_labels_opening_and_closing() {
        let ledger = build_ledger(
            &[sale(1, "2024-01-02", 100.0, Some("9000000001"))],
            &[payment(1, "2024-01-01", 150.0), payment(2, "2024-02-01", 10.0)],
        )
        .unwrap();
        let period = ledger.period(Some(day("2024-01-02")), Some(day("2024-01-31")));
        let data = StatementData::new(
            business(),
            &customer(),
            &period,
            (Some(day("2024-01-02")), Some(day("2024-01-31"))),
            &config(),
            day("2024-03-01"),
        );

        // 150 paid in advance, then a 100 sale inside the period
        assert_eq!((data.opening_balance, data.opening_label.as_str()), (150.0, "Cr"));
        assert_eq!((data.closing_balance, data.closing_label.as_str()), (50.0, "Cr"));
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.rows[0].debit, Some(100.0));
        assert_eq!(data.rows[0].credit, None);
        assert_eq!(data.period, "02 Jan 2024 - 31 Jan 2024");
        assert_eq!(data.currency_symbol, "Rs.");
    }

    #[test]
    fn statement_period_defaults_to_first_entry_and_today() {
        let ledger =
            build_ledger(&[sale(1, "2024-01-05 12:00", 80.0, Some("9000000001"))], &[]).unwrap();
        let period = ledger.period(None, None);
        let data = StatementData::new(
            business(),
            &customer(),
            &period,
            (None, None),
            &config(),
            day("2024-02-10"),
        );

        assert_eq!(data.period, "05 Jan 2024 - 10 Feb 2024");
        assert_eq!(data.opening_label, "");
        assert_eq!((data.closing_balance, data.closing_label.as_str()), (80.0, "Dr"));
        assert_eq!(data.generated_date, "10 Feb 2024");
    }

    #[test]
    fn bill_with_dues_is_not_completed() {
        let bill = BillData::new(
            business(),
            &sale(7, "2024-01-05", 80.0, Some("9000000001")),
            Some(120.0),
            &config(),
        );
        assert_eq!(bill.number, "BILL-00007");
        assert_eq!(bill.previous_balance, Some(120.0));
        assert_eq!(bill.previous_label.as_deref(), Some("Dr"));
        assert_eq!(bill.previous_status.as_deref(), Some("Not Completed"));
        assert_eq!(bill.lines[0].quantity, 2);
    }

    #[test]
    fn bill_after_advance_is_completed_and_unsigned() {
        let bill = BillData::new(
            business(),
            &sale(8, "2024-01-05", 80.0, Some("9000000001")),
            Some(-600.0),
            &config(),
        );
        assert_eq!(bill.previous_balance, Some(600.0));
        assert_eq!(bill.previous_label.as_deref(), Some("Cr"));
        assert_eq!(bill.previous_status.as_deref(), Some("Completed"));
    }

    #[test]
    fn walk_in_bill_has_no_previous_balance() {
        let bill = BillData::new(business(), &sale(9, "2024-01-05", 80.0, None), None, &config());
        assert_eq!(bill.customer_name, "Walk-in customer");
        assert!(bill.previous_balance.is_none());
        assert!(bill.previous_label.is_none());
        assert!(bill.previous_status.is_none());
    }
}
