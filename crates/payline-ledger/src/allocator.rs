use payline_types::SplitRule;
use tracing::{debug, warn};

use crate::error::{AllocationError, AllocationResult};
use crate::records::{AllocationRequest, Ledger, LedgerEntry};

/// Largest cent total that `f64` still represents exactly (2^53).
pub const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

/// Converts a payment into a rounding-reconciled cent ledger.
///
/// Shares are `round(percent / 100 * total_cents)` with `f64::round`
/// (half away from zero). Whatever the shares fail to cover, or cover
/// twice, is added to the first entry so the ledger always balances.
pub struct SplitAllocator;

impl SplitAllocator {
    pub fn allocate(request: &AllocationRequest) -> AllocationResult<Ledger> {
        request.validate()?;

        let usdc_amount = request.usdc_amount();
        let scaled = usdc_amount * 100.0;
        if scaled > MAX_EXACT_CENTS {
            return Err(AllocationError::AmountTooLarge(usdc_amount));
        }
        let total_cents = scaled.round() as u64;

        let mut entries = Vec::with_capacity(request.rules.len());
        let mut allocated: i128 = 0;
        for rule in &request.rules {
            let share = naive_share(rule, total_cents);
            allocated += i128::from(share);
            entries.push(LedgerEntry::new(rule, share));
        }

        let diff = i128::from(total_cents) - allocated;
        let unbalanced = AllocationError::InvariantViolation {
            expected: total_cents,
            actual: allocated,
        };
        // only saturated shares from absurd percentages fall outside i64
        let rounding_correction = i64::try_from(diff).map_err(|_| unbalanced.clone())?;
        if let Some(first) = entries.first_mut() {
            if rounding_correction != 0 {
                let cents = first
                    .cents
                    .checked_add(rounding_correction)
                    .ok_or_else(|| unbalanced.clone())?;
                warn!(
                    address = %first.address,
                    correction = rounding_correction,
                    cents,
                    "rounding correction applied to first recipient"
                );
                first.set_cents(cents);
            }
        }

        let ledger = Ledger {
            usdc_amount,
            total_cents,
            rounding_correction,
            entries,
        };
        if !ledger.is_empty() && !ledger.is_balanced() {
            return Err(AllocationError::InvariantViolation {
                expected: ledger.total_cents,
                actual: ledger.allocated_cents(),
            });
        }

        debug!(
            total_cents,
            recipients = ledger.entries.len(),
            correction = rounding_correction,
            "allocation complete"
        );
        Ok(ledger)
    }

    /// The share a rule would receive before reconciliation.
    pub fn naive_share_of(rule: &SplitRule, total_cents: u64) -> i64 {
        naive_share(rule, total_cents)
    }
}

fn naive_share(rule: &SplitRule, total_cents: u64) -> i64 {
    // `as` saturates for values beyond i64; validated percents are finite
    ((rule.percent / 100.0) * total_cents as f64).round() as i64
}

/// Parse split rules from their JSON form,
/// e.g. `[{"address":"0xA","percent":60},{"address":"0xB","percent":40}]`.
pub fn parse_rules(json: &str) -> AllocationResult<Vec<SplitRule>> {
    serde_json::from_str(json).map_err(|e| AllocationError::InvalidRules(e.to_string()))
}
