//! Money amounts in minor currency units.
//!
//! # Responsibility
//! - Parse user-entered amount text under a configured currency scale.
//! - Render amounts and totals with locale-default digit grouping.
//!
//! # Invariants
//! - An `Amount` is always in `1..=Amount::MAX`.
//! - Parsing never rounds: extra fractional digits are rejected.
//! - Only ASCII digits are accepted; other Unicode digits are invalid input.

use crate::model::expense::ExpenseValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Largest supported fractional digit count (scale).
pub const MAX_SCALE: u8 = 4;

static AMOUNT_INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<int>[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(?:\.(?P<frac>[0-9]+))?$")
        .expect("valid amount regex")
});

/// Strictly positive amount counted in the smallest currency unit.
///
/// With scale 0 (yen) one unit is one yen; with scale 2 one unit is a cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Upper bound for a single entry, in minor units.
    pub const MAX: i64 = 1_000_000_000_000;

    /// Wraps a minor-unit count after range checks.
    pub fn new(minor_units: i64) -> Result<Self, ExpenseValidationError> {
        if minor_units <= 0 {
            return Err(ExpenseValidationError::NonPositiveAmount);
        }
        if minor_units > Self::MAX {
            return Err(ExpenseValidationError::AmountTooLarge { max: Self::MAX });
        }
        Ok(Self(minor_units))
    }

    /// Parses form input such as `1200`, `1,200` or `12.50` (scale 2).
    ///
    /// # Errors
    /// - `InvalidAmount` for text that is not a plain decimal number or has
    ///   more fractional digits than `scale`.
    /// - `NonPositiveAmount` for zero or a leading minus sign.
    /// - `AmountTooLarge` beyond `Amount::MAX`.
    pub fn parse(input: &str, scale: u8) -> Result<Self, ExpenseValidationError> {
        let trimmed = input.trim();
        if let Some(unsigned) = trimmed.strip_prefix('-') {
            if AMOUNT_INPUT_RE.is_match(unsigned) {
                return Err(ExpenseValidationError::NonPositiveAmount);
            }
        }

        let invalid = || ExpenseValidationError::InvalidAmount(trimmed.to_string());
        let too_large = ExpenseValidationError::AmountTooLarge { max: Self::MAX };
        let captures = AMOUNT_INPUT_RE.captures(trimmed).ok_or_else(invalid)?;
        if scale > MAX_SCALE {
            return Err(invalid());
        }

        let whole_digits = captures["int"].replace(',', "");
        let fraction_digits = captures.name("frac").map_or("", |m| m.as_str());
        if fraction_digits.len() > usize::from(scale) {
            return Err(invalid());
        }

        let factor = 10_i64.pow(u32::from(scale));
        let whole: i64 = whole_digits.parse().map_err(|_| too_large.clone())?;
        let mut fraction: i64 = 0;
        if !fraction_digits.is_empty() {
            fraction = fraction_digits.parse().map_err(|_| invalid())?;
            let pad = usize::from(scale) - fraction_digits.len();
            fraction *= 10_i64.pow(pad as u32);
        }

        let minor_units = whole
            .checked_mul(factor)
            .and_then(|value| value.checked_add(fraction))
            .ok_or(too_large)?;
        Self::new(minor_units)
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// Formats this amount with digit grouping, e.g. `1,234.56`.
    pub fn display(self, scale: u8) -> String {
        format_minor_units(self.0, scale)
    }
}

impl TryFrom<i64> for Amount {
    type Error = ExpenseValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Renders a minor-unit count with `,` grouping and `scale` fraction digits.
///
/// Used for both single amounts and ledger totals; totals may be zero.
pub fn format_minor_units(value: i64, scale: u8) -> String {
    let scale = scale.min(MAX_SCALE);
    let factor = 10_u64.pow(u32::from(scale));
    let magnitude = value.unsigned_abs();
    let whole = (magnitude / factor).to_string();
    let fraction = magnitude % factor;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 8);
    if value < 0 {
        grouped.push('-');
    }
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if scale > 0 {
        grouped.push('.');
        grouped.push_str(&format!("{:0width$}", fraction, width = usize::from(scale)));
    }
    grouped
}
