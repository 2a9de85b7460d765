//! Protocol roles.
//!
//! Each role owns its private state and mutates it only from its own
//! handlers (`&mut self`). Messages cross between roles by value.
//! The verifier alone decides when the exchange ends and what the verdict is;
//! the prover has no vote.

use crate::error::RoleError;
use crate::message::TranscriptMessage;
use crate::types::{PublicKey, Signature};

/// The proving side of an interactive argument.
pub trait ProverRole {
    /// Take ownership of a message from the verifier.
    fn receive_message(&mut self, msg: TranscriptMessage) -> Result<(), RoleError>;

    /// Produce the next message for the verifier.
    fn send_message(&mut self) -> Result<TranscriptMessage, RoleError>;
}

/// The verifying side of an interactive argument.
pub trait VerifierRole {
    /// Produce the next message for the prover.
    fn send_message(&mut self) -> Result<TranscriptMessage, RoleError>;

    /// Take ownership of a message from the prover (or the claim hand-off).
    fn receive_message(&mut self, msg: TranscriptMessage) -> Result<(), RoleError>;

    /// `true` once no further rounds are needed.
    fn done_interacting(&self) -> bool;

    /// Final verdict. Only meaningful once `done_interacting()` is true.
    fn verify(&self) -> bool;
}

impl<P: ProverRole + ?Sized> ProverRole for Box<P> {
    fn receive_message(&mut self, msg: TranscriptMessage) -> Result<(), RoleError> {
        (**self).receive_message(msg)
    }

    fn send_message(&mut self) -> Result<TranscriptMessage, RoleError> {
        (**self).send_message()
    }
}

impl<V: VerifierRole + ?Sized> VerifierRole for Box<V> {
    fn send_message(&mut self) -> Result<TranscriptMessage, RoleError> {
        (**self).send_message()
    }

    fn receive_message(&mut self, msg: TranscriptMessage) -> Result<(), RoleError> {
        (**self).receive_message(msg)
    }

    fn done_interacting(&self) -> bool {
        (**self).done_interacting()
    }

    fn verify(&self) -> bool {
        (**self).verify()
    }
}

/// A signed data item whose derived claim is established by a proof exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claim {
    /// The data item.
    pub data: Vec<u8>,
    /// Signature over `data`.
    pub signature: Signature,
    /// Signer's key.
    pub public_key: PublicKey,
}

impl Claim {
    /// Bundle the three parts.
    #[must_use]
    pub fn new(data: &[u8], signature: &Signature, public_key: &PublicKey) -> Self {
        Self {
            data: data.to_vec(),
            signature: signature.clone(),
            public_key: public_key.clone(),
        }
    }

    /// The hand-off message delivered to a fresh verifier.
    #[must_use]
    pub fn into_message(self) -> TranscriptMessage {
        TranscriptMessage::Claim {
            data: self.data,
            signature: self.signature,
            public_key: self.public_key,
        }
    }
}

/// Creates a fresh, unshared Prover/Verifier pair per session.
///
/// The prover may be primed with the claim (it needs its witness); the
/// verifier learns the claim only from the [`TranscriptMessage::Claim`]
/// hand-off.
pub trait RoleFactory {
    /// Prover type.
    type Prover: ProverRole;
    /// Verifier type.
    type Verifier: VerifierRole;

    /// Build a new pair for `claim`.
    fn spawn(&self, claim: &Claim) -> (Self::Prover, Self::Verifier);
}

impl<R: RoleFactory + ?Sized> RoleFactory for &R {
    type Prover = R::Prover;
    type Verifier = R::Verifier;

    fn spawn(&self, claim: &Claim) -> (Self::Prover, Self::Verifier) {
        (**self).spawn(claim)
    }
}
