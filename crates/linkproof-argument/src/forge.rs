//! Signed demo chains.
//!
//! Block `i` is sealed over its predecessor's hash and signed with a one-time
//! Lamport key derived from `seed ‖ i`, so every block carries its own key.

use anyhow::{ensure, Result};
use linkproof_core::{Block, BlockChain, BlockHash};
use tracing::debug;

use crate::lamport::LamportSigner;

/// Builds (and, for negative tests, breaks) signed chains.
#[derive(Clone, Debug)]
pub struct ChainForge {
    seed: Vec<u8>,
}

impl ChainForge {
    /// Forge whose per-block keys derive from `seed`.
    #[must_use]
    pub fn new(seed: &[u8]) -> Self {
        Self {
            seed: seed.to_vec(),
        }
    }

    /// Signer for block `index`.
    #[must_use]
    pub fn signer_for(&self, index: usize) -> LamportSigner {
        let mut s = self.seed.clone();
        s.extend_from_slice(b"/block/");
        s.extend_from_slice(&(index as u64).to_le_bytes());
        LamportSigner::from_seed(&s)
    }

    /// Chain of `len` blocks with payloads `"block <i>"`.
    #[must_use]
    pub fn forge(&self, len: usize) -> BlockChain {
        self.forge_with(len, |i| format!("block {i}").into_bytes())
    }

    /// Chain of `len` blocks with caller-chosen payloads.
    pub fn forge_with<F>(&self, len: usize, mut payload: F) -> BlockChain
    where
        F: FnMut(usize) -> Vec<u8>,
    {
        let mut chain = BlockChain::new();
        for i in 0..len {
            let signer = self.signer_for(i);
            let block = Block::seal(chain.tip_hash(), payload(i), signer.public_key());
            let sig = signer.sign(block.hash().as_bytes());
            chain.push(block.with_signature(sig));
        }
        debug!(len, tip = %chain.tip_hash(), "forged chain");
        chain
    }

    /// Point block `index` (>= 1) at the wrong predecessor. The block stays
    /// correctly signed, so only linkage fails.
    pub fn tamper_link(chain: &mut BlockChain, index: usize) -> Result<()> {
        let len = chain.as_slice().len();
        ensure!(
            index >= 1 && index < len,
            "tamper-link index {index} out of range 1..{len}"
        );
        let blk = &mut chain.blocks_mut()[index];
        let mut bytes = *blk.previous_hash.as_bytes();
        bytes[0] ^= 0x01;
        blk.previous_hash = BlockHash(bytes);
        Ok(())
    }

    /// Replace block `index`'s signature with one over a different message
    /// under the same key.
    pub fn tamper_signature(&self, chain: &mut BlockChain, index: usize) -> Result<()> {
        let len = chain.as_slice().len();
        ensure!(index < len, "tamper-sig index {index} out of range 0..{len}");
        let forged = self.signer_for(index).sign(b"not this block");
        chain.blocks_mut()[index].signature = forged;
        Ok(())
    }
}
