//! Audit trail for Payline allocations.
//!
//! An [`AuditRecord`] is a hashed snapshot of one allocation run: its inputs,
//! the reconciled ledger, and a SHA-256 content hash over the canonical JSON
//! of both. An [`AuditBatch`] is an ordered run of records plus the Merkle
//! root over their hashes, so any later change to a record, or to the order
//! of records, shows up as a different root.
//!
//! - [`AuditRecorder`]: sequential record accumulation and batch finalization
//! - [`AuditBatch::verify`]: recompute every hash and the root of a saved batch
//! - [`BatchRunner`]: the automated allocation test runner (random or fixed inputs)

pub mod batch;
pub mod error;
pub mod record;
pub mod recorder;
pub mod runner;

pub use batch::{AuditBatch, BatchReport, BatchVerification};
pub use error::{AuditError, AuditResult};
pub use record::AuditRecord;
pub use recorder::AuditRecorder;
pub use runner::{BatchConfig, BatchRunner};
