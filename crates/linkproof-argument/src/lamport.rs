//! Lamport one-time signatures behind the core signature traits.

use linkproof_core::{PublicKey, Signature, SignatureVerifier};
use linkproof_crypto::{lamport, LamportKeypair};

/// [`SignatureVerifier`] for hex-encoded Lamport signatures.
///
/// Any decoding or length problem yields `false`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LamportVerifier;

impl SignatureVerifier for LamportVerifier {
    fn verify(&self, digest: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        signature
            .decode()
            .is_some_and(|sig| lamport::verify(digest, &sig, public_key.as_bytes()))
    }
}

/// Seed-derived Lamport key pair producing core-typed keys and signatures.
///
/// One-time: signing two different messages with the same signer leaks
/// enough of the secret to forge. [`crate::ChainForge`] derives one signer
/// per block for that reason.
#[derive(Debug)]
pub struct LamportSigner {
    keys: LamportKeypair,
}

impl LamportSigner {
    /// Derive the key pair from `seed`.
    #[must_use]
    pub fn from_seed(seed: &[u8]) -> Self {
        Self {
            keys: LamportKeypair::from_seed(seed),
        }
    }

    /// Public key in core form.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.keys.public_key().to_vec())
    }

    /// Sign `message` and hex-encode the result.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from_bytes(&self.keys.sign(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signer_and_verifier_agree() {
        let s = LamportSigner::from_seed(b"seed");
        let sig = s.sign(b"msg");
        assert!(LamportVerifier.verify(b"msg", &sig, &s.public_key()));
        assert!(!LamportVerifier.verify(b"msh", &sig, &s.public_key()));
    }

    #[test]
    fn malformed_inputs_are_rejected_not_panicked() {
        let s = LamportSigner::from_seed(b"seed");
        let pk = s.public_key();
        assert!(!LamportVerifier.verify(b"msg", &Signature("zz".into()), &pk));
        assert!(!LamportVerifier.verify(b"msg", &Signature::from_bytes(&[1, 2, 3]), &pk));
        assert!(!LamportVerifier.verify(b"msg", &s.sign(b"msg"), &PublicKey(vec![0; 5])));
    }
}
