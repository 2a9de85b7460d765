//! Lamport one-time signatures over BLAKE3.
//!
//! A hash-based scheme small enough to audit at a glance:
//! - the secret key is `2 × 256` 32-byte preimages derived from a seed;
//! - the public key is the BLAKE3 image of every preimage (16 KiB);
//! - a signature reveals one preimage per bit of the message digest (8 KiB).
//!
//! Each key pair must sign **at most one** message. Callers that sign many
//! records (e.g. one per block) derive a fresh key per record.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use blake3::Hasher;

/// Bits in the signed message digest.
pub const DIGEST_BITS: usize = 256;
/// Size of each preimage / image chunk.
pub const CHUNK_LEN: usize = 32;
/// Encoded public key length in bytes.
pub const PUBLIC_KEY_LEN: usize = 2 * DIGEST_BITS * CHUNK_LEN;
/// Encoded signature length in bytes.
pub const SIGNATURE_LEN: usize = DIGEST_BITS * CHUNK_LEN;

const DS_SECRET: &str = "linkproof lamport v1 secret";
const DS_MESSAGE: &[u8] = b"linkproof.lamport.msg.v1";

type Chunk = [u8; CHUNK_LEN];

/// Seed-derived Lamport key pair.
#[derive(Clone)]
pub struct LamportKeypair {
    /// `secret[2*i + b]` is the preimage revealed when bit `i` equals `b`.
    secret: Vec<Chunk>,
    public: Vec<u8>,
}

impl std::fmt::Debug for LamportKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LamportKeypair")
            .field("public_prefix", &&self.public[..8])
            .finish_non_exhaustive()
    }
}

impl LamportKeypair {
    /// Deterministically derive a key pair from `seed`.
    #[must_use]
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut h = Hasher::new_derive_key(DS_SECRET);
        h.update(seed);
        let mut xof = h.finalize_xof();

        let mut secret = vec![[0u8; CHUNK_LEN]; 2 * DIGEST_BITS];
        for chunk in &mut secret {
            xof.fill(chunk);
        }

        let mut public = Vec::with_capacity(PUBLIC_KEY_LEN);
        for chunk in &secret {
            public.extend_from_slice(blake3::hash(chunk).as_bytes());
        }
        Self { secret, public }
    }

    /// Encoded public key (`PUBLIC_KEY_LEN` bytes).
    #[inline]
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    /// Sign `message`, returning `SIGNATURE_LEN` bytes.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let digest = message_digest(message);
        let mut sig = Vec::with_capacity(SIGNATURE_LEN);
        for i in 0..DIGEST_BITS {
            let bit = usize::from(bit_at(&digest, i));
            sig.extend_from_slice(&self.secret[2 * i + bit]);
        }
        sig
    }
}

/// Verify `signature` over `message` under `public_key`.
///
/// Malformed lengths are rejected with `false`; this never panics.
#[must_use]
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    if signature.len() != SIGNATURE_LEN || public_key.len() != PUBLIC_KEY_LEN {
        return false;
    }
    let digest = message_digest(message);
    signature
        .chunks_exact(CHUNK_LEN)
        .enumerate()
        .all(|(i, preimage)| {
            let bit = usize::from(bit_at(&digest, i));
            let off = (2 * i + bit) * CHUNK_LEN;
            blake3::hash(preimage).as_bytes()[..] == public_key[off..off + CHUNK_LEN]
        })
}

fn message_digest(message: &[u8]) -> Chunk {
    let mut h = Hasher::new();
    h.update(DS_MESSAGE);
    h.update(&(message.len() as u64).to_le_bytes());
    h.update(message);
    *h.finalize().as_bytes()
}

#[inline]
const fn bit_at(digest: &Chunk, i: usize) -> u8 {
    (digest[i / 8] >> (i % 8)) & 1
}
