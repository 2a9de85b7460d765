//! Sequential chain-integrity verification.
//!
//! For each block in strictly increasing order:
//! 1. verify the block's signature over its own hash with its own key;
//! 2. for every block but the first, check `previous_hash` against the
//!    predecessor's `hash`.
//!
//! The first failure ends the walk; nothing after it is examined. At a single
//! position the signature check always runs before the linkage check, so a
//! block with both defects reports [`ChainError::InvalidSignature`].

use tracing::{debug, warn};

use crate::chain::Chain;
use crate::error::ChainError;
use crate::signature::SignatureVerifier;
use crate::types::{Block, BlockHash, PublicKey, Signature};

/// Summary of a chain that passed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainReport {
    /// Number of blocks checked (equals the chain length).
    pub blocks_checked: usize,
    /// Hash of the last block, `None` for an empty chain.
    pub tip: Option<BlockHash>,
}

/// Walks a chain, checking signatures and hash linkage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainVerifier<S> {
    sig: S,
}

impl<S: SignatureVerifier> ChainVerifier<S> {
    /// Verifier backed by `sig`.
    #[must_use]
    pub const fn new(sig: S) -> Self {
        Self { sig }
    }

    /// Borrow the signature backend.
    pub const fn signature_verifier(&self) -> &S {
        &self.sig
    }

    /// Check `signature` over `block`'s hash under `public_key`.
    ///
    /// The block's own signature and key are ignored, so a caller can check
    /// a block against credentials carried elsewhere. Linkage is not checked.
    #[must_use]
    pub fn verify_block(&self, block: &Block, signature: &Signature, public_key: &PublicKey) -> bool {
        self.sig.verify(block.hash().as_bytes(), signature, public_key)
    }

    /// Boolean verdict for `chain`. An empty chain is valid.
    #[must_use]
    pub fn verify_chain<C: Chain + ?Sized>(&self, chain: &C) -> bool {
        match self.check_chain(chain) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "chain rejected");
                false
            }
        }
    }

    /// Verify `chain`, returning the first failure with its position.
    pub fn check_chain<C: Chain + ?Sized>(&self, chain: &C) -> Result<ChainReport, ChainError> {
        let len = chain.len();
        if len == 0 {
            return Ok(ChainReport {
                blocks_checked: 0,
                tip: None,
            });
        }

        for i in 0..len {
            let current = chain.block_at(i);
            self.check_signature(i, current)?;

            if i > 0 {
                let previous = chain.block_at(i - 1);
                check_link(i, previous.hash(), current)?;
            }
            debug!(index = i, hash = %current.hash(), "block verified");
        }

        Ok(ChainReport {
            blocks_checked: len,
            tip: Some(*chain.block_at(len - 1).hash()),
        })
    }

    /// Streaming variant over fallible block sources (e.g. a JSONL reader).
    ///
    /// Applies the same per-block order as [`Self::check_chain`] while keeping
    /// only the previous hash in memory. A source error at position `i` is
    /// reported as [`ChainError::Source`] and ends the walk.
    pub fn check_stream<I, E>(&self, blocks: I) -> Result<ChainReport, ChainError>
    where
        I: IntoIterator<Item = Result<Block, E>>,
        E: std::fmt::Display,
    {
        let mut prev: Option<BlockHash> = None;
        let mut n = 0usize;

        for (i, item) in blocks.into_iter().enumerate() {
            let block = item.map_err(|e| ChainError::Source {
                index: i,
                reason: format!("{e:#}"),
            })?;

            self.check_signature(i, &block)?;
            if let Some(p) = &prev {
                check_link(i, p, &block)?;
            }
            debug!(index = i, hash = %block.hash(), "block verified");

            prev = Some(block.hash);
            n = i + 1;
        }

        Ok(ChainReport {
            blocks_checked: n,
            tip: prev,
        })
    }

    fn check_signature(&self, index: usize, block: &Block) -> Result<(), ChainError> {
        if self.verify_block(block, block.signature(), block.public_key()) {
            Ok(())
        } else {
            Err(ChainError::InvalidSignature { index })
        }
    }
}

fn check_link(index: usize, expected: &BlockHash, block: &Block) -> Result<(), ChainError> {
    if block.previous_hash() == expected {
        Ok(())
    } else {
        Err(ChainError::BrokenLink {
            index,
            expected: *expected,
            found: *block.previous_hash(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::FnSignatureVerifier;
    use std::cell::RefCell;

    /// "Valid" means the signature string spells the hash in hex.
    fn sign(b: Block) -> Block {
        let s = Signature(b.hash.to_string());
        b.with_signature(s)
    }

    fn mk_chain(n: usize) -> Vec<Block> {
        let mut out: Vec<Block> = Vec::with_capacity(n);
        for i in 0..n {
            let prev = out.last().map_or(BlockHash::ZERO, |b| b.hash);
            out.push(sign(Block::seal(prev, vec![i as u8], PublicKey(vec![i as u8]))));
        }
        out
    }

    fn hex_sig_checker(log: &RefCell<Vec<Vec<u8>>>) -> impl SignatureVerifier + '_ {
        FnSignatureVerifier::new(move |d: &[u8], s: &Signature, _: &PublicKey| {
            log.borrow_mut().push(d.to_vec());
            s.decode().as_deref() == Some(d)
        })
    }

    #[test]
    fn empty_chain_is_valid_and_never_calls_backend() {
        let log = RefCell::new(Vec::new());
        let v = ChainVerifier::new(hex_sig_checker(&log));
        let report = v.check_chain(&Vec::<Block>::new()).expect("valid");
        assert_eq!(report.blocks_checked, 0);
        assert_eq!(report.tip, None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn single_block_skips_linkage() {
        let log = RefCell::new(Vec::new());
        let v = ChainVerifier::new(hex_sig_checker(&log));
        // Arbitrary back-reference: a lone block is never linked against anything.
        let lone = sign(Block::seal(BlockHash([9; 32]), vec![], PublicKey::default()));
        assert!(v.verify_chain(&vec![lone]));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn signature_is_checked_over_the_stored_hash() {
        let log = RefCell::new(Vec::new());
        let v = ChainVerifier::new(hex_sig_checker(&log));
        let chain = mk_chain(3);
        assert!(v.verify_chain(&chain));
        let seen = log.borrow();
        for (blk, digest) in chain.iter().zip(seen.iter()) {
            assert_eq!(digest.as_slice(), blk.hash.as_bytes());
        }
    }

    #[test]
    fn verify_block_uses_the_supplied_credentials() {
        let v = ChainVerifier::new(FnSignatureVerifier::new(
            |d: &[u8], s: &Signature, pk: &PublicKey| {
                pk.as_bytes() == b"foreign" && s.decode().as_deref() == Some(d)
            },
        ));
        let block = mk_chain(1).remove(0);
        let foreign_key = PublicKey(b"foreign".to_vec());
        let foreign_sig = Signature(block.hash.to_string());

        assert!(v.verify_block(&block, &foreign_sig, &foreign_key));
        assert!(!v.verify_block(&block, &foreign_sig, block.public_key()));
        assert!(!v.verify_block(&block, &Signature("00".into()), &foreign_key));
        // The block's own key is not the foreign one, so the walk rejects it.
        assert_eq!(
            v.check_chain(&vec![block]),
            Err(ChainError::InvalidSignature { index: 0 })
        );
    }

    #[test]
    fn source_errors_keep_their_cause_chain() {
        let v = ChainVerifier::new(FnSignatureVerifier::new(
            |_: &[u8], _: &Signature, _: &PublicKey| true,
        ));
        let cause = anyhow::anyhow!("expected value at column 1").context("parse jsonl line 3");
        let err = v
            .check_stream(std::iter::once(Err::<Block, _>(cause)))
            .unwrap_err();
        assert_eq!(
            err,
            ChainError::Source {
                index: 0,
                reason: "parse jsonl line 3: expected value at column 1".into()
            }
        );
    }

    #[test]
    fn signature_failure_wins_over_link_failure_at_same_index() {
        let log = RefCell::new(Vec::new());
        let v = ChainVerifier::new(hex_sig_checker(&log));
        let mut chain = mk_chain(3);
        chain[1].previous_hash = BlockHash([7; 32]);
        chain[1].signature = Signature("00".into());
        assert_eq!(
            v.check_chain(&chain),
            Err(ChainError::InvalidSignature { index: 1 })
        );
    }

    #[test]
    fn stream_matches_slice_verdicts() {
        let v = ChainVerifier::new(FnSignatureVerifier::new(
            |d: &[u8], s: &Signature, _: &PublicKey| s.decode().as_deref() == Some(d),
        ));
        let chain = mk_chain(4);
        let ok = v
            .check_stream(chain.iter().cloned().map(Ok::<_, String>))
            .expect("valid");
        assert_eq!(ok.blocks_checked, 4);
        assert_eq!(ok.tip, Some(chain[3].hash));

        let mut broken = chain.clone();
        broken[2].previous_hash = BlockHash::ZERO;
        let err = v
            .check_stream(broken.iter().cloned().map(Ok::<_, String>))
            .unwrap_err();
        assert_eq!(err, v.check_chain(&broken).unwrap_err());

        let failing = chain
            .into_iter()
            .take(1)
            .map(Ok)
            .chain(std::iter::once(Err("disk gone".to_string())));
        assert_eq!(
            v.check_stream(failing),
            Err(ChainError::Source {
                index: 1,
                reason: "disk gone".into()
            })
        );
    }
}
