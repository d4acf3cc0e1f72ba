use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("wallet client error: {0}")]
    Client(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    #[error("wallet returned no accounts")]
    NoAccounts,

    #[error("token decimals {0} are below cent precision")]
    UnsupportedDecimals(u32),

    #[error("cannot transfer a negative share of {0} cents")]
    NegativeAmount(i64),

    #[error("{cents} cents overflow base units at {decimals} decimals")]
    AmountOverflow { cents: u64, decimals: u32 },
}

pub type ChainResult<T> = Result<T, ChainError>;
