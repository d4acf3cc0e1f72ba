use payline_ledger::AllocationRequest;
use payline_types::{Currency, SplitRule};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::batch::AuditBatch;
use crate::error::AuditResult;
use crate::recorder::AuditRecorder;

/// Configuration for an automated allocation test batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of allocation runs in the batch.
    pub test_count: usize,
    /// Draw the exchange rate from `[0.95, 1.05)` instead of using 1.0.
    pub randomize_exchange_rate: bool,
    /// Generate 3-5 random whole-percent recipients per run instead of
    /// using `fallback_rules`.
    pub randomize_splits: bool,
    /// Rules used for every run when splits are not randomized.
    pub fallback_rules: Vec<SplitRule>,
    /// Seed for reproducible batches. Entropy-seeded when unset.
    pub seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            test_count: 10,
            randomize_exchange_rate: false,
            randomize_splits: false,
            fallback_rules: vec![
                SplitRule::new("0xRECIPIENT_A", 33.33),
                SplitRule::new("0xRECIPIENT_B", 33.33),
                SplitRule::new("0xRECIPIENT_C", 33.34),
            ],
            seed: None,
        }
    }
}

/// Runs a batch of allocations and records each one.
///
/// Every run draws an amount from `[1, 501)` in the foreign currency, so the
/// exchange rate always participates in the conversion.
pub struct BatchRunner {
    config: BatchConfig,
    rng: StdRng,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Generate the request for test `test_number` (1-based). Random
    /// recipients are addressed by the 0-based run index.
    pub fn next_request(&mut self, test_number: u64) -> AllocationRequest {
        let amount = self.rng.gen::<f64>() * 500.0 + 1.0;
        let fx = if self.config.randomize_exchange_rate {
            0.95 + self.rng.gen::<f64>() * 0.1
        } else {
            1.0
        };
        let rules = if self.config.randomize_splits {
            random_splits(&mut self.rng, test_number.saturating_sub(1))
        } else {
            self.config.fallback_rules.clone()
        };
        AllocationRequest::new(amount, Currency::Foreign, fx, rules)
    }

    /// Run every test and close the batch.
    pub fn run(mut self) -> AuditResult<AuditBatch> {
        let mut recorder = AuditRecorder::new();
        for _ in 0..self.config.test_count {
            let request = self.next_request(recorder.next_test_number());
            recorder.run(&request)?;
        }
        let batch = recorder.finalize();
        info!(
            tests = batch.len(),
            rounding_issues = batch.rounding_issues(),
            root = ?batch.merkle_root.map(|r| r.to_hex()),
            "audit batch complete"
        );
        Ok(batch)
    }
}

/// 3-5 recipients with whole percentages summing to 100, each at least 1,
/// addressed `0xTEST{run_index}_{k}`.
fn random_splits<R: Rng>(rng: &mut R, run_index: u64) -> Vec<SplitRule> {
    let n: u32 = rng.gen_range(3..=5);
    let mut left: u32 = 100;
    let mut rules = Vec::with_capacity(n as usize);
    for k in 0..n - 1 {
        // keep at least 1% for each recipient still to come
        let room = left - (n - k - 1);
        let p = rng.gen_range(0..room) + 1;
        left -= p;
        rules.push(SplitRule::new(format!("0xTEST{run_index}_{k}"), f64::from(p)));
    }
    rules.push(SplitRule::new(
        format!("0xTEST{run_index}_{}", n - 1),
        f64::from(left),
    ));
    rules
}
