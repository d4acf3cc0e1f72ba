//! Live-transfer boundary for Payline.
//!
//! Wallet access and transfer broadcast belong to an external client; this
//! crate only defines the contract ([`WalletClient`]) and drives it:
//!
//! - [`TransferSession`]: explicit connection context that pays out a ledger
//! - [`TransactionVerifier`]: best-effort receipt check (not a proof)
//! - [`InMemoryWallet`]: client implementation for tests and local demos
//! - [`ChainConfig`]: token contract, decimals, and call timeout

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod receipt;
pub mod session;
pub mod verifier;

pub use client::{TransferSubmission, WalletClient};
pub use config::ChainConfig;
pub use error::{ChainError, ChainResult};
pub use memory::InMemoryWallet;
pub use receipt::{ReceiptLog, TransferReceipt};
pub use session::{TransferOutcome, TransferSession};
pub use verifier::TransactionVerifier;
