use proptest::prelude::*;

use payline_ledger::{AllocationRequest, SplitAllocator};
use payline_types::{Currency, SplitRule};

/// Integer percentages that add up to exactly 100, like the batch runner produces.
fn whole_percent_rules() -> impl Strategy<Value = Vec<SplitRule>> {
    prop::collection::vec(1u32..100, 1..8).prop_map(|weights| {
        let mut left = 100u32;
        let mut rules = Vec::new();
        for (i, w) in weights.iter().enumerate() {
            let p = (*w).min(left);
            left -= p;
            rules.push(SplitRule::new(format!("0x{i:02}"), f64::from(p)));
        }
        rules.push(SplitRule::new("0xlast", f64::from(left)));
        rules
    })
}

fn fractional_rules() -> impl Strategy<Value = Vec<SplitRule>> {
    prop::collection::vec(0.0f64..60.0, 1..6).prop_map(|percents| {
        percents
            .into_iter()
            .enumerate()
            .map(|(i, p)| SplitRule::new(format!("0x{i:02}"), p))
            .collect()
    })
}

proptest! {
    /// Entry cents always add up to the total.
    #[test]
    fn entries_conserve_total(
        amount in 0.01f64..1_000_000.0,
        fx in 0.5f64..2.0,
        foreign in any::<bool>(),
        rules in whole_percent_rules(),
    ) {
        let currency = if foreign { Currency::Foreign } else { Currency::Accounting };
        let ledger = SplitAllocator::allocate(&AllocationRequest::new(amount, currency, fx, rules)).unwrap();
        prop_assert_eq!(ledger.allocated_cents(), i128::from(ledger.total_cents));
    }

    /// Only the first entry may deviate from its naive share.
    #[test]
    fn correction_only_touches_first_entry(
        amount in 0.01f64..100_000.0,
        rules in whole_percent_rules(),
    ) {
        let request = AllocationRequest::new(amount, Currency::Accounting, 1.0, rules.clone());
        let ledger = SplitAllocator::allocate(&request).unwrap();
        for (entry, rule) in ledger.entries.iter().zip(&rules).skip(1) {
            prop_assert_eq!(entry.cents, SplitAllocator::naive_share_of(rule, ledger.total_cents));
        }
        let first_naive = SplitAllocator::naive_share_of(&rules[0], ledger.total_cents);
        prop_assert_eq!(ledger.entries[0].cents, first_naive + ledger.rounding_correction);
    }

    /// Arbitrary fractional percentages, summing to anything, still balance.
    #[test]
    fn fractional_rules_never_unbalance(
        amount in 0.01f64..10_000.0,
        rules in fractional_rules(),
    ) {
        let request = AllocationRequest::new(amount, Currency::Accounting, 1.0, rules);
        let ledger = SplitAllocator::allocate(&request).unwrap();
        prop_assert!(ledger.is_balanced());
    }

    /// The display amount always mirrors the cents.
    #[test]
    fn display_amount_tracks_cents(amount in 0.01f64..10_000.0, rules in whole_percent_rules()) {
        let ledger = SplitAllocator::allocate(&AllocationRequest::new(amount, Currency::Accounting, 1.0, rules)).unwrap();
        for entry in &ledger.entries {
            let shown: f64 = entry.display_amount.parse().unwrap();
            prop_assert_eq!((shown * 100.0).round() as i64, entry.cents);
            prop_assert_eq!(entry.display_amount.starts_with('-'), entry.cents < 0);
        }
    }
}
