//! Canonical core types used across the linkproof workspace.
//!
//! These are re-exported at the crate root so other crates can import via
//! `linkproof_core::Block`, `linkproof_core::BlockHash`, etc.
//!
//! Byte-valued fields serialize as lowercase hex so JSON chains stay readable;
//! CBOR carries the same strings.

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain prefix for [`Block::seal`].
const DS_BLOCK: &[u8] = b"linkproof.block.v1";

/// Serde adapter: `Vec<u8>` as a hex string.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        hex::decode(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: `[u8; 32]` as a hex string.
mod hex_digest {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let encoded = String::deserialize(d)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(&encoded, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}

/// 32-byte block identity. Compared only by equality.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(#[serde(with = "hex_digest")] pub [u8; 32]);

impl BlockHash {
    /// The all-zero hash, used as the head block's back-reference.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Borrow the raw digest bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps logs and assertion diffs legible.
        write!(f, "BlockHash({})", &hex::encode(self.0)[..16])
    }
}

impl From<[u8; 32]> for BlockHash {
    fn from(v: [u8; 32]) -> Self {
        Self(v)
    }
}

/// Opaque public key bytes. The core never inspects the format.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(#[serde(with = "hex_bytes")] pub Vec<u8>);

impl PublicKey {
    /// Borrow the raw key bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = &self.0[..self.0.len().min(8)];
        write!(f, "PublicKey({}…, {} bytes)", hex::encode(head), self.0.len())
    }
}

impl From<Vec<u8>> for PublicKey {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

/// Signature in its string (hex) form.
///
/// Kept as a string because that is how signatures travel between parties;
/// backends decode with [`Signature::decode`].
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(pub String);

impl Signature {
    /// Hex-encode raw signature bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Borrow the string form.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode to raw bytes; `None` if the string is not valid hex.
    #[must_use]
    pub fn decode(&self) -> Option<Vec<u8>> {
        hex::decode(&self.0).ok()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0.chars().take(16).collect();
        write!(f, "Signature({head}…, {} chars)", self.0.len())
    }
}

/// One signed unit of the chain.
///
/// `previous_hash` is a back-reference by value, never an owning link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Identity of this block; also the digest the signature covers.
    pub hash: BlockHash,
    /// Hash of the immediate predecessor ([`BlockHash::ZERO`] for a head block).
    pub previous_hash: BlockHash,
    /// Signature over `hash`.
    pub signature: Signature,
    /// Key that produced `signature`.
    pub public_key: PublicKey,
    /// Opaque application payload.
    #[serde(with = "hex_bytes", default)]
    pub payload: Vec<u8>,
}

impl Block {
    /// Build an unsigned block whose `hash` binds `previous_hash`, `payload`
    /// and `public_key` (length-prefixed, domain separated).
    ///
    /// Attach the signature afterwards with [`Block::with_signature`].
    #[must_use]
    pub fn seal(previous_hash: BlockHash, payload: Vec<u8>, public_key: PublicKey) -> Self {
        let mut h = Hasher::new();
        h.update(DS_BLOCK);
        h.update(previous_hash.as_bytes());
        h.update(&(payload.len() as u64).to_le_bytes());
        h.update(&payload);
        h.update(&(public_key.0.len() as u64).to_le_bytes());
        h.update(&public_key.0);
        Self {
            hash: BlockHash(*h.finalize().as_bytes()),
            previous_hash,
            signature: Signature::default(),
            public_key,
            payload,
        }
    }

    /// Replace the signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Block identity.
    #[inline]
    #[must_use]
    pub const fn hash(&self) -> &BlockHash {
        &self.hash
    }

    /// Predecessor back-reference.
    #[inline]
    #[must_use]
    pub const fn previous_hash(&self) -> &BlockHash {
        &self.previous_hash
    }

    /// Stored signature.
    #[inline]
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Stored public key.
    #[inline]
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Opaque payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_binds_every_field() {
        let pk = PublicKey(vec![1, 2, 3]);
        let a = Block::seal(BlockHash::ZERO, b"p".to_vec(), pk.clone());
        let b = Block::seal(BlockHash([1; 32]), b"p".to_vec(), pk.clone());
        let c = Block::seal(BlockHash::ZERO, b"q".to_vec(), pk);
        let d = Block::seal(BlockHash::ZERO, b"p".to_vec(), PublicKey(vec![1, 2]));
        assert_ne!(a.hash, b.hash);
        assert_ne!(a.hash, c.hash);
        assert_ne!(a.hash, d.hash);
        assert_eq!(a.previous_hash, BlockHash::ZERO);
        assert!(a.signature.as_str().is_empty());
    }

    #[test]
    fn json_uses_hex_strings() {
        let blk = Block::seal(BlockHash::ZERO, vec![0xab], PublicKey(vec![0xcd]))
            .with_signature(Signature::from_bytes(&[0xef]));
        let v = serde_json::to_value(&blk).expect("serialize");
        assert_eq!(v["previous_hash"], "0".repeat(64));
        assert_eq!(v["public_key"], "cd");
        assert_eq!(v["signature"], "ef");
        assert_eq!(v["payload"], "ab");

        let back: Block = serde_json::from_value(v).expect("deserialize");
        assert_eq!(back, blk);
    }

    #[test]
    fn signature_decode_rejects_non_hex() {
        assert_eq!(Signature::from_bytes(&[1, 2]).decode(), Some(vec![1, 2]));
        assert_eq!(Signature("zz".into()).decode(), None);
    }

    #[test]
    fn bad_hash_length_is_a_decode_error() {
        let err = serde_json::from_str::<BlockHash>("\"abcd\"");
        assert!(err.is_err());
    }
}
