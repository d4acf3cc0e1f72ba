use payline_ledger::{AllocationRequest, Ledger, SplitAllocator};
use tracing::debug;

use crate::batch::AuditBatch;
use crate::error::{AuditError, AuditResult};
use crate::record::AuditRecord;

/// Accumulates audit records for one batch, strictly in sequence order.
#[derive(Debug, Default)]
pub struct AuditRecorder {
    records: Vec<AuditRecord>,
}

impl AuditRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot one run. Does not append it.
    pub fn record(
        test_number: u64,
        request: &AllocationRequest,
        ledger: &Ledger,
    ) -> AuditResult<AuditRecord> {
        AuditRecord::new(test_number, request, ledger)
    }

    /// The test number the next appended record must carry.
    pub fn next_test_number(&self) -> u64 {
        self.records.len() as u64 + 1
    }

    /// Append a record. Out-of-order test numbers are rejected.
    pub fn push(&mut self, record: AuditRecord) -> AuditResult<()> {
        let expected = self.next_test_number();
        if record.test_number != expected {
            return Err(AuditError::OutOfOrder {
                expected,
                actual: record.test_number,
            });
        }
        debug!(test = record.test_number, hash = %record.hash.short_hex(), "audit record appended");
        self.records.push(record);
        Ok(())
    }

    /// Record an already computed ledger under the next test number.
    pub fn append(&mut self, request: &AllocationRequest, ledger: &Ledger) -> AuditResult<&AuditRecord> {
        let record = Self::record(self.next_test_number(), request, ledger)?;
        self.push(record)?;
        Ok(&self.records[self.records.len() - 1])
    }

    /// Allocate a request and record the result under the next test number.
    pub fn run(&mut self, request: &AllocationRequest) -> AuditResult<&AuditRecord> {
        let ledger = SplitAllocator::allocate(request)?;
        self.append(request, &ledger)
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Close the batch and compute its Merkle root.
    pub fn finalize(self) -> AuditBatch {
        AuditBatch::from_records(self.records)
    }
}
