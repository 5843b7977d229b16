//! Plain-text rendering of the ledger.

use okozukai_core::{format_minor_units, CurrencyConfig, LedgerStore};
use std::fmt::Write as _;

/// `¥ 1,700` style money text.
pub fn money(minor_units: i64, currency: &CurrencyConfig) -> String {
    format!(
        "{} {}",
        currency.symbol,
        format_minor_units(minor_units, currency.scale)
    )
}

pub fn render_total(ledger: &LedgerStore, currency: &CurrencyConfig) -> String {
    format!("total: {}", money(ledger.total(), currency))
}

/// One row per expense (`index  amount  memo`) followed by the total.
pub fn render_ledger(ledger: &LedgerStore, currency: &CurrencyConfig) -> String {
    let amounts: Vec<String> = ledger
        .list()
        .iter()
        .map(|expense| money(expense.amount.minor_units(), currency))
        .collect();
    let width = amounts.iter().map(|text| text.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    if ledger.is_empty() {
        out.push_str("(no expenses)\n");
    }
    for (index, (expense, amount)) in ledger.list().iter().zip(&amounts).enumerate() {
        let pad = width - amount.chars().count();
        let _ = writeln!(out, "{index:>3}  {}{amount}  {}", " ".repeat(pad), expense.memo);
    }
    out.push_str(&render_total(ledger, currency));
    out.push('\n');
    out
}
