//! Foundation types for Payline.
//!
//! This crate provides the value types shared by every other Payline crate:
//! allocation inputs and the hash type used across the audit trail.
//!
//! # Key Types
//!
//! - [`ContentHash`]: SHA-256 digest, displayed as lowercase hex
//! - [`Currency`]: Accounting (settlement) unit vs. foreign display unit
//! - [`SplitRule`]: One recipient's percentage of a payment

pub mod currency;
pub mod error;
pub mod hash;
pub mod split;

pub use currency::Currency;
pub use error::TypeError;
pub use hash::ContentHash;
pub use split::SplitRule;
