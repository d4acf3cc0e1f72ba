use payline_types::ContentHash;
use serde::{Deserialize, Serialize};

use crate::hasher::ContentHasher;

/// Side of a sibling in a Merkle proof path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Fold an ordered list of leaf hashes into a single root.
///
/// - no leaves: `None`
/// - one leaf: the leaf itself, not re-hashed
/// - otherwise: adjacent pairs are combined as
///   `sha256(hex(left) + hex(right))`, an odd trailing node is paired with
///   itself, and levels are folded until one node remains.
///
/// Leaf order is significant and is never normalized.
pub fn build_root(leaves: &[ContentHash]) -> Option<ContentHash> {
    match leaves {
        [] => None,
        [single] => Some(*single),
        _ => {
            let mut level = next_level(leaves);
            while level.len() > 1 {
                level = next_level(&level);
            }
            level.first().copied()
        }
    }
}

/// Binary Merkle tree for proof of inclusion.
///
/// Constructed from an ordered set of leaf hashes. Keeps every level so
/// inclusion proofs can be produced for any leaf.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// The root hash, `None` for an empty tree.
    root: Option<ContentHash>,
    /// All tree nodes stored level by level.
    /// Level 0 = leaves, last level = `[root]`.
    levels: Vec<Vec<ContentHash>>,
}

impl MerkleTree {
    /// Build a Merkle tree from leaf hashes.
    ///
    /// An empty list has no root. A single leaf is its own root.
    pub fn from_leaves(leaves: Vec<ContentHash>) -> Self {
        if leaves.is_empty() {
            return Self {
                root: None,
                levels: vec![],
            };
        }

        let mut levels = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next = next_level(current);
            levels.push(next);
        }

        let root = levels.last().and_then(|level| level.first().copied());
        Self { root, levels }
    }

    /// The root hash of the tree.
    pub fn root(&self) -> Option<ContentHash> {
        self.root
    }

    /// Original leaf hashes.
    pub fn leaves(&self) -> &[ContentHash] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Number of levels including the leaf level.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        let root = self.root?;
        let leaf = *self.leaves().get(index)?;

        let mut path = Vec::new();
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            // Odd level: the last node is paired with itself
            let sibling = level.get(sibling_idx).copied().unwrap_or(level[idx]);
            let side = if idx % 2 == 0 {
                Side::Right
            } else {
                Side::Left
            };
            path.push((sibling, side));
            idx /= 2;
        }

        Some(MerkleProof { leaf, path, root })
    }
}

/// Merkle inclusion proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// The leaf being proven.
    pub leaf: ContentHash,
    /// Path of (sibling_hash, sibling_side) pairs from leaf to root.
    pub path: Vec<(ContentHash, Side)>,
    /// Expected root hash.
    pub root: ContentHash,
}

impl MerkleProof {
    /// Verify the proof: recompute the root from the leaf and path.
    pub fn verify(&self) -> bool {
        let mut current = self.leaf;
        for (sibling, side) in &self.path {
            current = match side {
                Side::Left => hash_pair(sibling, &current),
                Side::Right => hash_pair(&current, sibling),
            };
        }
        current == self.root
    }
}

fn next_level(level: &[ContentHash]) -> Vec<ContentHash> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [odd] => hash_pair(odd, odd),
            _ => unreachable!("chunks(2) yields one or two nodes"),
        })
        .collect()
}

fn hash_pair(left: &ContentHash, right: &ContentHash) -> ContentHash {
    let mut combined = String::with_capacity(ContentHash::HEX_LEN * 2);
    combined.push_str(&left.to_hex());
    combined.push_str(&right.to_hex());
    ContentHasher::digest_str(&combined)
}
