//! Money formatting for terminal output.

use crate::ledger::balance_label;

/// Insert thousands separators into a run of ASCII digits
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 1234567 -> "1,234,567"
pub fn format_grouped_int(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Two decimals with thousands separators: 1250.5 -> "1,250.50"
pub fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    match whole.strip_prefix('-') {
        Some(digits) => format!("-{}.{}", group_digits(digits), frac),
        None => format!("{}.{}", group_digits(whole), frac),
    }
}

pub fn format_money(value: f64, currency_symbol: &str) -> String {
    format!("{}{}", currency_symbol, format_amount(value))
}

/// Balance without sign plus Dr/Cr: -40 -> "Rs.40.00 Cr"
pub fn format_balance(value: f64, currency_symbol: &str) -> String {
    let label = balance_label(value);
    let money = format_money(value.abs(), currency_symbol);
    if label.is_empty() {
        money
    } else {
        format!("{money} {label}")
    }
}
