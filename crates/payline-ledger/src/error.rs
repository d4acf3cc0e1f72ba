/// Errors produced by split allocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("invalid amount {0}: must be a finite number greater than zero")]
    InvalidAmount(f64),

    #[error("amount {0} is too large to convert to exact cents")]
    AmountTooLarge(f64),

    #[error("invalid exchange rate {0}: must be a finite number greater than zero")]
    InvalidExchangeRate(f64),

    #[error("invalid percent {percent} for recipient {address}")]
    InvalidPercent { address: String, percent: f64 },

    #[error("invalid split rules: {0}")]
    InvalidRules(String),

    #[error("ledger invariant violated: entries sum to {actual} cents, expected {expected}")]
    InvariantViolation { expected: u64, actual: i128 },
}

pub type AllocationResult<T> = Result<T, AllocationError>;
