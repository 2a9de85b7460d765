//! Minimal BLAKE3 Merkle tree over 32-byte values.
//!
//! Leaves are padded with zero digests up to the next power of two so every
//! level pairs cleanly and a path is exactly `log2(width)` siblings.
//! Leaf and node hashes are domain separated.

use blake3::Hasher;
use serde::{Deserialize, Serialize};

const DS_LEAF: &[u8] = b"linkproof.merkle.leaf";
const DS_NODE: &[u8] = b"linkproof.merkle.node";

/// Sibling path for one leaf, bottom → top.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerklePath {
    /// Sibling digests from the leaf level upward.
    pub siblings: Vec<[u8; 32]>,
}

/// Merkle tree retaining every level so openings are cheap.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// `levels[0]` are hashed leaves; the last level holds the root.
    levels: Vec<Vec<[u8; 32]>>,
    n_values: usize,
}

#[inline]
fn leaf_digest(value: &[u8; 32]) -> [u8; 32] {
    let mut h = Hasher::new();
    h.update(DS_LEAF);
    h.update(value);
    *h.finalize().as_bytes()
}

#[inline]
fn node_digest(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut h = Hasher::new();
    h.update(DS_NODE);
    h.update(left);
    h.update(right);
    *h.finalize().as_bytes()
}

impl MerkleTree {
    /// Build a tree over `values` (an empty input yields a single zero leaf).
    #[must_use]
    pub fn from_values(values: &[[u8; 32]]) -> Self {
        let width = values.len().max(1).next_power_of_two();
        let mut lvl: Vec<[u8; 32]> = values.iter().map(leaf_digest).collect();
        lvl.resize(width, [0u8; 32]);

        let mut levels = vec![lvl];
        while levels.last().map_or(0, Vec::len) > 1 {
            let prev = &levels[levels.len() - 1];
            let next: Vec<[u8; 32]> = prev
                .chunks_exact(2)
                .map(|pair| node_digest(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }
        Self {
            levels,
            n_values: values.len(),
        }
    }

    /// Root digest.
    #[must_use]
    pub fn root(&self) -> [u8; 32] {
        self.levels
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or([0u8; 32])
    }

    /// Number of committed (unpadded) values.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.n_values
    }

    /// Whether no values were committed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n_values == 0
    }

    /// Sibling path for value `index`, or `None` if out of range.
    #[must_use]
    pub fn open(&self, index: usize) -> Option<MerklePath> {
        if index >= self.n_values {
            return None;
        }
        let mut idx = index;
        let mut siblings = Vec::with_capacity(self.levels.len().saturating_sub(1));
        for lvl in &self.levels[..self.levels.len() - 1] {
            siblings.push(lvl[idx ^ 1]);
            idx >>= 1;
        }
        Some(MerklePath { siblings })
    }

    /// Check that `value` sits at `index` under `root`.
    #[must_use]
    pub fn verify(root: [u8; 32], value: &[u8; 32], index: usize, path: &MerklePath) -> bool {
        // A path longer than the index space cannot describe this tree.
        if path.siblings.len() < usize::BITS as usize && index >> path.siblings.len() != 0 {
            return false;
        }
        let mut cur = leaf_digest(value);
        let mut idx = index;
        for sib in &path.siblings {
            cur = if idx & 1 == 0 {
                node_digest(&cur, sib)
            } else {
                node_digest(sib, &cur)
            };
            idx >>= 1;
        }
        cur == root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(n: usize) -> Vec<[u8; 32]> {
        (0..n)
            .map(|i| *blake3::hash(&(i as u64).to_le_bytes()).as_bytes())
            .collect()
    }

    #[test]
    fn every_opening_verifies() {
        for n in [1usize, 2, 3, 5, 8, 13] {
            let v = values(n);
            let t = MerkleTree::from_values(&v);
            assert_eq!(t.len(), n);
            for (i, x) in v.iter().enumerate() {
                let p = t.open(i).unwrap();
                assert!(MerkleTree::verify(t.root(), x, i, &p), "n={n} i={i}");
            }
            assert!(t.open(n).is_none());
        }
    }

    #[test]
    fn tampered_value_or_index_fails() {
        let v = values(6);
        let t = MerkleTree::from_values(&v);
        let p = t.open(2).unwrap();
        let mut bad = v[2];
        bad[0] ^= 1;
        assert!(!MerkleTree::verify(t.root(), &bad, 2, &p));
        assert!(!MerkleTree::verify(t.root(), &v[2], 3, &p));
        assert!(!MerkleTree::verify(t.root(), &v[2], 2 + 8, &p));
    }

    #[test]
    fn empty_tree_has_stable_root() {
        let a = MerkleTree::from_values(&[]);
        let b = MerkleTree::from_values(&[]);
        assert!(a.is_empty());
        assert_eq!(a.root(), b.root());
        assert!(a.open(0).is_none());
    }

    proptest::proptest! {
        #[test]
        fn openings_verify_only_their_own_leaf(
            leaves in proptest::collection::vec(proptest::prelude::any::<[u8; 32]>(), 1..40),
            pick in proptest::prelude::any::<proptest::sample::Index>(),
        ) {
            let t = MerkleTree::from_values(&leaves);
            let i = pick.index(leaves.len());
            let p = t.open(i).unwrap();
            proptest::prop_assert!(MerkleTree::verify(t.root(), &leaves[i], i, &p));
            let mut other = leaves[i];
            other[31] ^= 0x80;
            proptest::prop_assert!(!MerkleTree::verify(t.root(), &other, i, &p));
        }
    }
}
