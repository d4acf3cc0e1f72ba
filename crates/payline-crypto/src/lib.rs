//! Cryptographic primitives for Payline.
//!
//! Provides SHA-256 content hashing with a canonical JSON encoding, and
//! binary Merkle trees (duplicate-last-node padding) with inclusion proofs.
//!
//! Digests come from `sha2`; this crate only fixes the encodings fed to it.

pub mod hasher;
pub mod merkle;

pub use hasher::{ContentHasher, HasherError};
pub use merkle::{build_root, MerkleProof, MerkleTree, Side};
