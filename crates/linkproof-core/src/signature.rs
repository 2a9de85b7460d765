//! Signature capability abstraction.
//!
//! Both verifiers depend on this one primitive and nothing else cryptographic.
//!
//! ## Contracts implementors should uphold
//! - Return `true` iff the underlying scheme accepts `signature` over `digest`
//!   under `public_key`.
//! - Malformed input (bad hex, wrong key length, …) yields `false`; never panic.
//! - No side effects visible to the caller.

use std::sync::Arc;

use crate::types::{PublicKey, Signature};

/// Verify one signature against one message digest and public key.
pub trait SignatureVerifier {
    /// Check `signature` over `digest` under `public_key`.
    fn verify(&self, digest: &[u8], signature: &Signature, public_key: &PublicKey) -> bool;
}

impl<S: SignatureVerifier + ?Sized> SignatureVerifier for &S {
    fn verify(&self, digest: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        (**self).verify(digest, signature, public_key)
    }
}

impl<S: SignatureVerifier + ?Sized> SignatureVerifier for Box<S> {
    fn verify(&self, digest: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        (**self).verify(digest, signature, public_key)
    }
}

impl<S: SignatureVerifier + ?Sized> SignatureVerifier for Arc<S> {
    fn verify(&self, digest: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        (**self).verify(digest, signature, public_key)
    }
}

/// Adapter turning a closure into a [`SignatureVerifier`].
///
/// Handy for tests and for wiring schemes that already expose a free function.
#[derive(Clone, Copy)]
pub struct FnSignatureVerifier<F>(F);

impl<F> FnSignatureVerifier<F>
where
    F: Fn(&[u8], &Signature, &PublicKey) -> bool,
{
    /// Wrap `f`.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> SignatureVerifier for FnSignatureVerifier<F>
where
    F: Fn(&[u8], &Signature, &PublicKey) -> bool,
{
    fn verify(&self, digest: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        (self.0)(digest, signature, public_key)
    }
}

impl<F> std::fmt::Debug for FnSignatureVerifier<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnSignatureVerifier(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_and_wrappers_delegate() {
        let accept_ab = FnSignatureVerifier::new(|d: &[u8], _: &Signature, _: &PublicKey| d == b"ab");
        let sig = Signature::default();
        let pk = PublicKey::default();
        assert!(accept_ab.verify(b"ab", &sig, &pk));
        assert!(!accept_ab.verify(b"ba", &sig, &pk));

        let boxed: Box<dyn SignatureVerifier> = Box::new(accept_ab);
        assert!(boxed.verify(b"ab", &sig, &pk));
        let shared = Arc::new(accept_ab);
        assert!((&shared).verify(b"ab", &sig, &pk));
    }
}
