// crates/linkproof-crypto/src/lib.rs

//! Crypto substrate for linkproof: a BLAKE3 transcript with a simple
//! absorb/challenge API, Lamport one-time signatures, and a small Merkle tree.
//!
//! ⚠️ **Security note:** these are reference backends for exercising the
//! verification core end to end. The transcript models a domain-separated
//! random oracle; the Lamport keys are strictly one-time. Production
//! deployments plug their own schemes in behind the core traits.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions)]

/// Lamport one-time signatures over BLAKE3.
pub mod lamport;
/// Power-of-two Merkle tree with sibling-path openings.
pub mod merkle;

pub use lamport::{LamportKeypair, PUBLIC_KEY_LEN, SIGNATURE_LEN};
pub use merkle::{MerklePath, MerkleTree};

use blake3::Hasher;

/// Fixed domain prefix to seed transcripts.
const TRANSCRIPT_PREFIX: &[u8] = b"linkproof.transcript.v0";

/// Transcript interface used by protocol roles.
///
/// Implementations should apply domain separation for both absorbs and challenges.
pub trait Transcript {
    /// Add raw bytes under a label (domain-separated).
    fn absorb(&mut self, label: &str, bytes: &[u8]);

    /// Convenience: absorb an unsigned 64-bit value (LE).
    fn absorb_u64(&mut self, label: &str, x: u64) {
        self.absorb(label, &x.to_le_bytes());
    }

    /// Squeeze `n` bytes as a challenge under `label`.
    ///
    /// Implementations should be deterministic with respect to the transcript state.
    #[must_use]
    fn challenge_bytes(&mut self, label: &str, n: usize) -> Vec<u8>;

    /// Squeeze a challenge and reduce it into `0..bound` (`bound > 0`).
    #[must_use]
    fn challenge_index(&mut self, label: &str, bound: u64) -> u64 {
        let raw = self.challenge_bytes(label, 8);
        let mut le = [0u8; 8];
        le.copy_from_slice(&raw[..8]);
        u64::from_le_bytes(le) % bound.max(1)
    }
}

/// Blake3-based transcript.
///
/// Deterministic, domain-separated random-oracle model.
/// **Do not** rely on this exact construction for security-critical deployments.
#[derive(Clone, Debug)]
pub struct Blake3Transcript {
    st: Hasher,
}

impl Blake3Transcript {
    /// Create a new transcript with a domain separation prefix.
    #[must_use]
    pub fn new(domain_sep: &str) -> Self {
        let mut st = Hasher::new();
        st.update(TRANSCRIPT_PREFIX);
        st.update(&(domain_sep.len() as u32).to_le_bytes());
        st.update(domain_sep.as_bytes());
        Self { st }
    }
}

impl Transcript for Blake3Transcript {
    fn absorb(&mut self, label: &str, bytes: &[u8]) {
        //   tag "absorb", label length+bytes, payload length+bytes.
        self.st.update(b"absorb");
        self.st.update(&(label.len() as u32).to_le_bytes());
        self.st.update(label.as_bytes());
        self.st.update(&(bytes.len() as u64).to_le_bytes());
        self.st.update(bytes);
    }

    fn challenge_bytes(&mut self, label: &str, n: usize) -> Vec<u8> {
        let mut st = self.st.clone();
        st.update(b"challenge");
        st.update(&(label.len() as u32).to_le_bytes());
        st.update(label.as_bytes());

        let mut out = vec![0u8; n];
        st.finalize_xof().fill(&mut out);

        // Forward progress: the next challenge under the same label differs.
        self.st.update(b"after_challenge");
        self.st.update(&(label.len() as u32).to_le_bytes());
        self.st.update(label.as_bytes());

        out
    }
}

/// Canonical transcript labels used by the reference argument.
/// Avoids stringly-typed mistakes in domain separation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Label {
    /// Argument parameters (steps, queries).
    Params,
    /// Verifier freshness nonce.
    Nonce,
    /// Claimed data item.
    ClaimData,
    /// Signature over the claimed data.
    ClaimSignature,
    /// Public key that produced the signature.
    ClaimKey,
    /// Prover trace commitment root.
    TraceRoot,
    /// Claimed computation output.
    TraceOutput,
    /// Spot-check query index.
    Query,
}

impl Label {
    /// Borrow the canonical string.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Params => "linkproof/params",
            Self::Nonce => "linkproof/nonce",
            Self::ClaimData => "linkproof/claim_data",
            Self::ClaimSignature => "linkproof/claim_sig",
            Self::ClaimKey => "linkproof/claim_key",
            Self::TraceRoot => "linkproof/trace_root",
            Self::TraceOutput => "linkproof/trace_output",
            Self::Query => "linkproof/query",
        }
    }
}
