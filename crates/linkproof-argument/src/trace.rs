//! The computation being argued about: an iterated BLAKE3 chain.
//!
//! `x0 = seed_value(data)`, `x(i+1) = hash_step(x(i))`, and the claimed output
//! is the last value of a trace of `steps` values.

use blake3::Hasher;
use linkproof_crypto::MerkleTree;

const DS_SEED: &[u8] = b"linkproof.trace.seed.v1";
const DS_STEP: &[u8] = b"linkproof.trace.step.v1";

/// First trace value for `data`.
#[must_use]
pub fn seed_value(data: &[u8]) -> [u8; 32] {
    let mut h = Hasher::new();
    h.update(DS_SEED);
    h.update(&(data.len() as u64).to_le_bytes());
    h.update(data);
    *h.finalize().as_bytes()
}

/// One transition of the computation.
#[inline]
#[must_use]
pub fn hash_step(x: &[u8; 32]) -> [u8; 32] {
    let mut h = Hasher::new();
    h.update(DS_STEP);
    h.update(x);
    *h.finalize().as_bytes()
}

/// All `steps` values of the trace over `data` (empty if `steps == 0`).
#[must_use]
pub fn compute_trace(data: &[u8], steps: u32) -> Vec<[u8; 32]> {
    let mut out = Vec::with_capacity(steps as usize);
    if steps == 0 {
        return out;
    }
    let mut x = seed_value(data);
    out.push(x);
    for _ in 1..steps {
        x = hash_step(&x);
        out.push(x);
    }
    out
}

/// A trace together with its Merkle commitment.
#[derive(Clone, Debug)]
pub struct CommittedTrace {
    values: Vec<[u8; 32]>,
    tree: MerkleTree,
}

impl CommittedTrace {
    /// Commit to an arbitrary sequence of values.
    #[must_use]
    pub fn new(values: Vec<[u8; 32]>) -> Self {
        let tree = MerkleTree::from_values(&values);
        Self { values, tree }
    }

    /// Merkle root over the values.
    #[must_use]
    pub fn root(&self) -> [u8; 32] {
        self.tree.root()
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the trace is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last value, if any.
    #[must_use]
    pub fn output(&self) -> Option<[u8; 32]> {
        self.values.last().copied()
    }

    /// Value and authentication path at `index`.
    #[must_use]
    pub fn open(&self, index: usize) -> Option<([u8; 32], Vec<[u8; 32]>)> {
        let value = *self.values.get(index)?;
        let path = self.tree.open(index)?;
        Some((value, path.siblings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkproof_crypto::MerklePath;

    #[test]
    fn trace_follows_the_step_function() {
        let t = compute_trace(b"abc", 5);
        assert_eq!(t.len(), 5);
        assert_eq!(t[0], seed_value(b"abc"));
        for w in t.windows(2) {
            assert_eq!(w[1], hash_step(&w[0]));
        }
        assert_ne!(seed_value(b"abc"), seed_value(b"abd"));
        assert!(compute_trace(b"abc", 0).is_empty());
    }

    #[test]
    fn openings_authenticate_against_the_root() {
        let c = CommittedTrace::new(compute_trace(b"x", 7));
        for i in 0..7 {
            let (v, siblings) = c.open(i).expect("in range");
            assert!(MerkleTree::verify(c.root(), &v, i, &MerklePath { siblings }));
        }
        assert!(c.open(7).is_none());
    }
}
