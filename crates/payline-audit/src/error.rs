use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("allocation failed: {0}")]
    Allocation(#[from] payline_ledger::AllocationError),

    #[error("hashing failed: {0}")]
    Hash(#[from] payline_crypto::HasherError),

    #[error("record out of order: expected test #{expected}, got #{actual}")]
    OutOfOrder { expected: u64, actual: u64 },

    #[error("record index {index} out of range for batch of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid batch report: {0}")]
    InvalidReport(String),
}

pub type AuditResult<T> = Result<T, AuditError>;
