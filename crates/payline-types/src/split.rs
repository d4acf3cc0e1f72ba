use std::fmt;

use serde::{Deserialize, Serialize};

/// One recipient's share of a payment.
///
/// A set of rules belongs to a single allocation request. Percentages are
/// expected to add up to 100 but nothing here enforces it; the allocator
/// absorbs whatever drift results into the first recipient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitRule {
    /// Recipient identifier, usually a `0x`-prefixed account address.
    pub address: String,
    /// Share of the payment in percent (0-100).
    pub percent: f64,
}

impl SplitRule {
    pub fn new(address: impl Into<String>, percent: f64) -> Self {
        Self {
            address: address.into(),
            percent,
        }
    }

    /// Sum of the percentages of a rule set.
    pub fn total_percent(rules: &[SplitRule]) -> f64 {
        rules.iter().map(|r| r.percent).sum()
    }
}

impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}%", self.address, self.percent)
    }
}
