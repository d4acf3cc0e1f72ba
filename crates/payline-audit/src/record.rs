use payline_crypto::ContentHasher;
use payline_ledger::{sum_cents, AllocationRequest, Ledger, LedgerEntry};
use payline_types::{ContentHash, Currency, SplitRule};
use serde::{Deserialize, Serialize};

use crate::error::AuditResult;

/// Hashed snapshot of one allocation run.
///
/// `hash` covers every other field through the canonical JSON encoding of
/// [`ContentHasher::canonical_json`]. Records are never modified after the
/// hash is set; [`AuditRecord::verify_hash`] detects any later edit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// 1-based position of the run within its batch.
    pub test_number: u64,
    pub amount: f64,
    pub currency: Currency,
    pub fx: f64,
    pub splits: Vec<SplitRule>,
    pub ledger: Vec<LedgerEntry>,
    pub usdc_amount: f64,
    pub total_cents: u64,
    pub rounding_correction: i64,
    pub hash: ContentHash,
}

/// Everything in a record except its hash, in the form that gets hashed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordBody<'a> {
    test_number: u64,
    amount: f64,
    currency: Currency,
    fx: f64,
    splits: &'a [SplitRule],
    ledger: &'a [LedgerEntry],
    usdc_amount: f64,
    total_cents: u64,
    rounding_correction: i64,
}

impl AuditRecord {
    /// Snapshot a run and compute its content hash.
    pub fn new(test_number: u64, request: &AllocationRequest, ledger: &Ledger) -> AuditResult<Self> {
        let mut record = Self {
            test_number,
            amount: request.amount,
            currency: request.currency,
            fx: request.exchange_rate,
            splits: request.rules.clone(),
            ledger: ledger.entries.clone(),
            usdc_amount: ledger.usdc_amount,
            total_cents: ledger.total_cents,
            rounding_correction: ledger.rounding_correction,
            hash: ContentHash::from_hash([0; 32]),
        };
        record.hash = record.compute_hash()?;
        Ok(record)
    }

    fn body(&self) -> RecordBody<'_> {
        RecordBody {
            test_number: self.test_number,
            amount: self.amount,
            currency: self.currency,
            fx: self.fx,
            splits: &self.splits,
            ledger: &self.ledger,
            usdc_amount: self.usdc_amount,
            total_cents: self.total_cents,
            rounding_correction: self.rounding_correction,
        }
    }

    /// The exact bytes the content hash is computed over.
    pub fn canonical_bytes(&self) -> AuditResult<Vec<u8>> {
        Ok(ContentHasher::canonical_json(&self.body())?)
    }

    /// Recompute the content hash from the current field values.
    pub fn compute_hash(&self) -> AuditResult<ContentHash> {
        Ok(ContentHasher::digest(&self.canonical_bytes()?))
    }

    /// Returns `true` if the stored hash still matches the content.
    pub fn verify_hash(&self) -> bool {
        self.compute_hash().map_or(false, |h| h == self.hash)
    }

    pub fn has_rounding_correction(&self) -> bool {
        self.rounding_correction != 0
    }

    /// Sum of the ledger entry cents.
    pub fn allocated_cents(&self) -> i128 {
        sum_cents(&self.ledger)
    }
}
