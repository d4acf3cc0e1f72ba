use payline_crypto::{build_root, MerkleProof, MerkleTree};
use payline_types::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};
use crate::record::AuditRecord;

/// Ordered audit records plus the Merkle root over their hashes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditBatch {
    pub records: Vec<AuditRecord>,
    /// `None` for an empty batch.
    pub merkle_root: Option<ContentHash>,
}

impl AuditBatch {
    /// Compute the root over the record hashes, in record order.
    pub fn from_records(records: Vec<AuditRecord>) -> Self {
        let merkle_root = build_root(&Self::hashes_of(&records));
        Self {
            records,
            merkle_root,
        }
    }

    fn hashes_of(records: &[AuditRecord]) -> Vec<ContentHash> {
        records.iter().map(|r| r.hash).collect()
    }

    /// Record hashes in sequence order.
    pub fn leaf_hashes(&self) -> Vec<ContentHash> {
        Self::hashes_of(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of runs whose ledger needed a rounding correction.
    pub fn rounding_issues(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.has_rounding_correction())
            .count()
    }

    /// Inclusion proof for the record at `index` (0-based).
    pub fn proof(&self, index: usize) -> AuditResult<MerkleProof> {
        MerkleTree::from_leaves(self.leaf_hashes())
            .proof(index)
            .ok_or(AuditError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
    }

    /// Recompute every record hash and the root.
    ///
    /// Root comparison uses the stored record hashes, so a record edited
    /// together with its hash still fails here unless the root was edited
    /// to match as well.
    pub fn verify(&self) -> BatchVerification {
        let tampered = self
            .records
            .iter()
            .filter(|r| !r.verify_hash())
            .map(|r| r.test_number)
            .collect();
        let out_of_sequence = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, r)| r.test_number != *i as u64 + 1)
            .map(|(_, r)| r.test_number)
            .collect();
        let unbalanced = self
            .records
            .iter()
            .filter(|r| !r.ledger.is_empty() && r.allocated_cents() != i128::from(r.total_cents))
            .map(|r| r.test_number)
            .collect();

        BatchVerification {
            records_checked: self.records.len(),
            tampered,
            out_of_sequence,
            unbalanced,
            root_matches: build_root(&self.leaf_hashes()) == self.merkle_root,
        }
    }

    /// Summary report in the published output shape.
    pub fn report(&self) -> BatchReport {
        BatchReport {
            total_tests: self.records.len(),
            rounding_issues: self.rounding_issues(),
            merkle_root: self.merkle_root,
            audits: self.records.clone(),
        }
    }
}

/// Published form of a batch: `{ totalTests, roundingIssues, merkleRoot, audits }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_tests: usize,
    pub rounding_issues: usize,
    pub merkle_root: Option<ContentHash>,
    pub audits: Vec<AuditRecord>,
}

impl BatchReport {
    pub fn to_json_pretty(&self) -> AuditResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AuditError::InvalidReport(e.to_string()))
    }

    pub fn from_json(json: &str) -> AuditResult<Self> {
        serde_json::from_str(json).map_err(|e| AuditError::InvalidReport(e.to_string()))
    }

    /// Rebuild the batch, keeping the published root as-is for verification.
    pub fn into_batch(self) -> AuditBatch {
        AuditBatch {
            records: self.audits,
            merkle_root: self.merkle_root,
        }
    }

    /// Returns `true` if the summary counters agree with the records.
    pub fn counters_match(&self) -> bool {
        self.total_tests == self.audits.len()
            && self.rounding_issues
                == self
                    .audits
                    .iter()
                    .filter(|r| r.has_rounding_correction())
                    .count()
    }
}

/// Outcome of [`AuditBatch::verify`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchVerification {
    pub records_checked: usize,
    /// Test numbers whose stored hash no longer matches their content.
    pub tampered: Vec<u64>,
    /// Test numbers found at the wrong position.
    pub out_of_sequence: Vec<u64>,
    /// Test numbers whose ledger cents do not add up to the total.
    pub unbalanced: Vec<u64>,
    pub root_matches: bool,
}

impl BatchVerification {
    /// Returns `true` if every check passed.
    pub fn is_valid(&self) -> bool {
        self.tampered.is_empty()
            && self.out_of_sequence.is_empty()
            && self.unbalanced.is_empty()
            && self.root_matches
    }
}
