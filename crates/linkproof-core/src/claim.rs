//! Claim verification: signature first, proof exchange only if it passes.
//!
//! `verify_with_proof` is `signature_valid && proof_valid` with real
//! short-circuiting: when the signature is bad the role factory is never
//! called, so no prover work is ever started for a claim that cannot pass.

use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::ClaimError;
use crate::role::{Claim, ProverRole, RoleFactory, VerifierRole};
use crate::session::ProtocolSession;
use crate::signature::SignatureVerifier;
use crate::types::{PublicKey, Signature};

/// Verifies signed data and, optionally, a derived claim about it.
#[derive(Debug, Clone)]
pub struct ClaimVerifier<S, R> {
    sig: S,
    roles: R,
    session: ProtocolSession,
}

impl<S, R> ClaimVerifier<S, R>
where
    S: SignatureVerifier,
    R: RoleFactory,
{
    /// Verifier over `sig`, spawning proof roles from `roles`.
    #[must_use]
    pub fn new(sig: S, roles: R, config: SessionConfig) -> Self {
        Self {
            sig,
            roles,
            session: ProtocolSession::new(config),
        }
    }

    /// Replace the session (e.g. to share a cancellation token).
    #[must_use]
    pub fn with_session(mut self, session: ProtocolSession) -> Self {
        self.session = session;
        self
    }

    /// Pure delegation to the signature backend over the raw data.
    #[must_use]
    pub fn verify_signature_only(
        &self,
        data: &[u8],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> bool {
        self.sig.verify(data, signature, public_key)
    }

    /// Boolean verdict of [`Self::check_with_proof`].
    #[must_use]
    pub fn verify_with_proof(
        &self,
        data: &[u8],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> bool {
        match self.check_with_proof(data, signature, public_key) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "claim rejected");
                false
            }
        }
    }

    /// Signature check, then (only on success) a fresh proof exchange.
    ///
    /// The verifier receives the `(data, signature, public_key)` bundle, then
    /// the prover's proof message. If the verifier wants further rounds the
    /// exchange continues through the bounded [`ProtocolSession`].
    pub fn check_with_proof(
        &self,
        data: &[u8],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> Result<(), ClaimError> {
        if !self.verify_signature_only(data, signature, public_key) {
            return Err(ClaimError::InvalidSignature);
        }

        let claim = Claim::new(data, signature, public_key);
        let (mut prover, mut verifier) = self.roles.spawn(&claim);

        verifier.receive_message(claim.into_message())?;
        let proof = prover.send_message()?;
        debug!(kind = %proof.kind(), "proof message delivered");
        verifier.receive_message(proof)?;

        let verdict = if verifier.done_interacting() {
            verifier.verify()
        } else {
            self.session.run_interaction(&mut prover, &mut verifier)?
        };

        if verdict {
            Ok(())
        } else {
            Err(ClaimError::ProofRejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RoleError, SessionError};
    use crate::message::TranscriptMessage;
    use crate::signature::FnSignatureVerifier;
    use std::cell::Cell;

    struct OneShotProver;

    impl ProverRole for OneShotProver {
        fn receive_message(&mut self, _: TranscriptMessage) -> Result<(), RoleError> {
            Ok(())
        }
        fn send_message(&mut self) -> Result<TranscriptMessage, RoleError> {
            Ok(TranscriptMessage::Opaque { tag: 1, bytes: b"proof".to_vec() })
        }
    }

    /// Accepts iff it saw a claim and then the expected proof bytes.
    #[derive(Default)]
    struct OneShotVerifier {
        saw_claim: bool,
        proof_ok: Option<bool>,
        endless: bool,
    }

    impl VerifierRole for OneShotVerifier {
        fn send_message(&mut self) -> Result<TranscriptMessage, RoleError> {
            Ok(TranscriptMessage::Challenge { index: 0 })
        }
        fn receive_message(&mut self, msg: TranscriptMessage) -> Result<(), RoleError> {
            match msg {
                TranscriptMessage::Claim { .. } => self.saw_claim = true,
                TranscriptMessage::Opaque { bytes, .. } => {
                    self.proof_ok = Some(self.saw_claim && bytes == b"proof");
                }
                other => {
                    return Err(RoleError::UnexpectedMessage { expected: "claim", got: other.kind() })
                }
            }
            Ok(())
        }
        fn done_interacting(&self) -> bool {
            !self.endless && self.proof_ok.is_some()
        }
        fn verify(&self) -> bool {
            self.proof_ok == Some(true)
        }
    }

    struct Factory {
        spawned: Cell<u32>,
        endless: bool,
    }

    impl RoleFactory for Factory {
        type Prover = OneShotProver;
        type Verifier = OneShotVerifier;
        fn spawn(&self, _: &Claim) -> (OneShotProver, OneShotVerifier) {
            self.spawned.set(self.spawned.get() + 1);
            (
                OneShotProver,
                OneShotVerifier { endless: self.endless, ..Default::default() },
            )
        }
    }

    fn sig_is_ok() -> impl SignatureVerifier {
        FnSignatureVerifier::new(|_: &[u8], s: &Signature, _: &PublicKey| s.as_str() == "ok")
    }

    #[test]
    fn single_message_proof_is_accepted() {
        let f = Factory { spawned: Cell::new(0), endless: false };
        let cv = ClaimVerifier::new(sig_is_ok(), &f, SessionConfig::default());
        assert!(cv.verify_with_proof(b"d", &Signature("ok".into()), &PublicKey::default()));
        assert_eq!(f.spawned.get(), 1);
    }

    #[test]
    fn bad_signature_never_spawns_roles() {
        let f = Factory { spawned: Cell::new(0), endless: false };
        let cv = ClaimVerifier::new(sig_is_ok(), &f, SessionConfig::default());
        assert_eq!(
            cv.check_with_proof(b"d", &Signature("bad".into()), &PublicKey::default()),
            Err(ClaimError::InvalidSignature)
        );
        assert_eq!(f.spawned.get(), 0);
    }

    #[test]
    fn non_terminating_verifier_hits_the_round_limit() {
        let f = Factory { spawned: Cell::new(0), endless: true };
        let cv = ClaimVerifier::new(sig_is_ok(), &f, SessionConfig::with_max_rounds(2));
        // The verifier never reports done, so the session stops at the bound.
        let err = cv
            .check_with_proof(b"d", &Signature("ok".into()), &PublicKey::default())
            .unwrap_err();
        assert_eq!(err, ClaimError::Session(SessionError::RoundLimit { max_rounds: 2 }));
    }
}
