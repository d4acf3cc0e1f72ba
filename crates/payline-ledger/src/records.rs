use payline_types::{Currency, SplitRule};
use serde::{Deserialize, Serialize};

use crate::error::{AllocationError, AllocationResult};

/// Inputs of one allocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    /// Payment amount in `currency`.
    pub amount: f64,
    pub currency: Currency,
    /// Accounting units per foreign unit. Ignored for accounting amounts
    /// but still validated.
    pub exchange_rate: f64,
    /// Recipients in payout order. The first recipient absorbs rounding.
    pub rules: Vec<SplitRule>,
}

impl AllocationRequest {
    pub fn new(amount: f64, currency: Currency, exchange_rate: f64, rules: Vec<SplitRule>) -> Self {
        Self {
            amount,
            currency,
            exchange_rate,
            rules,
        }
    }

    /// Check every numeric input before anything is allocated.
    pub fn validate(&self) -> AllocationResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(AllocationError::InvalidAmount(self.amount));
        }
        if !self.exchange_rate.is_finite() || self.exchange_rate <= 0.0 {
            return Err(AllocationError::InvalidExchangeRate(self.exchange_rate));
        }
        if let Some(rule) = self
            .rules
            .iter()
            .find(|r| !r.percent.is_finite() || r.percent < 0.0)
        {
            return Err(AllocationError::InvalidPercent {
                address: rule.address.clone(),
                percent: rule.percent,
            });
        }
        Ok(())
    }

    /// The amount expressed in the accounting unit.
    pub fn usdc_amount(&self) -> f64 {
        if self.currency.requires_conversion() {
            self.amount * self.exchange_rate
        } else {
            self.amount
        }
    }
}

/// One recipient's reconciled share.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub address: String,
    pub percent: f64,
    /// Share in whole cents. Only the first entry can be negative, when
    /// rounding overshoots by more than its naive share.
    pub cents: i64,
    /// `cents / 100` with exactly two fractional digits.
    #[serde(rename = "usdc")]
    pub display_amount: String,
}

impl LedgerEntry {
    pub fn new(rule: &SplitRule, cents: i64) -> Self {
        Self {
            address: rule.address.clone(),
            percent: rule.percent,
            cents,
            display_amount: format_cents(cents),
        }
    }

    pub(crate) fn set_cents(&mut self, cents: i64) {
        self.cents = cents;
        self.display_amount = format_cents(cents);
    }
}

/// Reconciled breakdown of one payment.
///
/// Whenever `entries` is non-empty, their cents add up to `total_cents`
/// exactly. `rounding_correction` records how many cents were moved onto
/// the first entry to get there (negative if taken away).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// The payment converted to the accounting unit, before rounding.
    pub usdc_amount: f64,
    pub total_cents: u64,
    pub rounding_correction: i64,
    pub entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Sum of all entry cents.
    pub fn allocated_cents(&self) -> i128 {
        sum_cents(&self.entries)
    }

    /// Returns `true` if the entries conserve the total.
    pub fn is_balanced(&self) -> bool {
        self.allocated_cents() == i128::from(self.total_cents)
    }

    /// Returns `true` if rounding drift had to be corrected.
    pub fn has_rounding_correction(&self) -> bool {
        self.rounding_correction != 0
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `total_cents` formatted like an entry amount.
    pub fn total_display(&self) -> String {
        format_magnitude(false, self.total_cents)
    }
}

/// Sum of entry cents, wide enough that it cannot overflow.
pub fn sum_cents(entries: &[LedgerEntry]) -> i128 {
    entries.iter().map(|e| i128::from(e.cents)).sum()
}

/// Format whole cents as a decimal string with two fractional digits,
/// e.g. `-1` as `"-0.01"`.
pub fn format_cents(cents: i64) -> String {
    format_magnitude(cents < 0, cents.unsigned_abs())
}

fn format_magnitude(negative: bool, cents: u64) -> String {
    let sign = if negative { "-" } else { "" };
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}
