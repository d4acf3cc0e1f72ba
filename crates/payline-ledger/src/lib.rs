//! Split allocation for Payline.
//!
//! This crate turns a payment amount and a list of percentage rules into a
//! [`Ledger`] of whole-cent shares. It provides:
//! - [`AllocationRequest`] input validation (amount, exchange rate, percents)
//! - [`SplitAllocator`] with round-half-away-from-zero share computation
//! - Rounding reconciliation: any drift is absorbed by the first recipient,
//!   so entry cents always add up to the total
//! - [`parse_rules`] for the JSON split-rule format

pub mod allocator;
pub mod error;
pub mod records;

pub use allocator::{parse_rules, SplitAllocator, MAX_EXACT_CENTS};
pub use error::{AllocationError, AllocationResult};
pub use records::{format_cents, sum_cents, AllocationRequest, Ledger, LedgerEntry};
