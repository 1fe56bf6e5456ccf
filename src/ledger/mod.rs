//! Customer ledger: sales become debits, payments become credits, merged into
//! one date-ordered list with a running balance.

mod statement;

pub use statement::{balance_label, bill_number, BillData, BillLine, StatementData, StatementRow};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{KhataError, Result};
use crate::model::{PaymentRecord, SaleRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Debit,
    Credit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub date: NaiveDateTime,
    pub kind: EntryKind,
    /// Id of the sale or payment this entry came from
    pub source_id: u32,
    pub description: String,
    pub debit: f64,
    pub credit: f64,
    /// Balance after this entry: cumulative debits minus cumulative credits
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Ledger {
    pub entries: Vec<LedgerEntry>,
    pub total_debit: f64,
    pub total_credit: f64,
}

/// The part of a ledger that falls inside a day range, carrying the balance
/// accumulated before it.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerPeriod<'a> {
    pub opening_balance: f64,
    pub entries: &'a [LedgerEntry],
    pub total_debit: f64,
    pub total_credit: f64,
    pub closing_balance: f64,
}

impl Ledger {
    /// Balance after the last entry (0 for an empty ledger)
    pub fn balance(&self) -> f64 {
        self.entries.last().map_or(0.0, |e| e.balance)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose day lies in `from..=to` (either bound optional).
    pub fn period(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> LedgerPeriod<'_> {
        let start = from.map_or(0, |from| {
            self.entries.partition_point(|e| e.date.date() < from)
        });
        let end = to.map_or(self.entries.len(), |to| {
            self.entries.partition_point(|e| e.date.date() <= to)
        });
        let end = end.max(start);

        let opening_balance = if start == 0 {
            0.0
        } else {
            self.entries[start - 1].balance
        };
        let entries = &self.entries[start..end];
        let total_debit: f64 = entries.iter().map(|e| e.debit).sum();
        let total_credit: f64 = entries.iter().map(|e| e.credit).sum();
        let closing_balance = entries.last().map_or(opening_balance, |e| e.balance);

        LedgerPeriod {
            opening_balance,
            entries,
            total_debit,
            total_credit,
            closing_balance,
        }
    }
}

fn check_amount(kind: &'static str, id: u32, amount: f64) -> Result<f64> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(KhataError::InvalidRecord { kind, id, amount })
    }
}

fn sale_description(sale: &SaleRecord) -> String {
    format!("{} x{} {}", sale.product_name, sale.quantity, sale.unit)
}

fn payment_description(payment: &PaymentRecord) -> String {
    match &payment.note {
        Some(note) => format!("Payment received ({note})"),
        None => "Payment received".to_string(),
    }
}

/// Build a ledger from records already scoped to one customer.
///
/// Sales come before payments in the merged list, and the sort is stable, so
/// records sharing a timestamp keep that order.
pub fn build_ledger(sales: &[SaleRecord], payments: &[PaymentRecord]) -> Result<Ledger> {
    let mut entries = Vec::with_capacity(sales.len() + payments.len());

    for sale in sales {
        let debit = check_amount("sale", sale.id, sale.total)?;
        entries.push(LedgerEntry {
            date: sale.date,
            kind: EntryKind::Debit,
            source_id: sale.id,
            description: sale_description(sale),
            debit,
            credit: 0.0,
            balance: 0.0,
        });
    }
    for payment in payments {
        let credit = check_amount("payment", payment.id, payment.amount)?;
        entries.push(LedgerEntry {
            date: payment.date,
            kind: EntryKind::Credit,
            source_id: payment.id,
            description: payment_description(payment),
            debit: 0.0,
            credit,
            balance: 0.0,
        });
    }

    entries.sort_by(|a, b| a.date.cmp(&b.date));

    let mut balance = 0.0;
    let mut total_debit = 0.0;
    let mut total_credit = 0.0;
    for entry in &mut entries {
        balance += entry.debit - entry.credit;
        total_debit += entry.debit;
        total_credit += entry.credit;
        entry.balance = balance;
    }

    Ok(Ledger {
        entries,
        total_debit,
        total_credit,
    })
}

/// Scope unfiltered records to one phone number, then build its ledger
pub fn build_customer_ledger(
    phone: &str,
    sales: &[SaleRecord],
    payments: &[PaymentRecord],
) -> Result<Ledger> {
    let sales: Vec<SaleRecord> = sales.iter().filter(|s| s.is_for(phone)).cloned().collect();
    let payments: Vec<PaymentRecord> = payments
        .iter()
        .filter(|p| p.customer_phone == phone)
        .cloned()
        .collect();
    build_ledger(&sales, &payments)
}

/// Σ sale totals − Σ payment amounts, without materializing entries
pub fn customer_balance(sales: &[SaleRecord], payments: &[PaymentRecord]) -> Result<f64> {
    let mut debits = 0.0;
    for sale in sales {
        debits += check_amount("sale", sale.id, sale.total)?;
    }
    let mut credits = 0.0;
    for payment in payments {
        credits += check_amount("payment", payment.id, payment.amount)?;
    }
    Ok(debits - credits)
}

/// The customer's balance from every record except the given sale
pub fn balance_before_sale(
    sale_id: u32,
    sales: &[SaleRecord],
    payments: &[PaymentRecord],
) -> Result<f64> {
    let others: Vec<SaleRecord> = sales.iter().filter(|s| s.id != sale_id).cloned().collect();
    customer_balance(&others, payments)
}
