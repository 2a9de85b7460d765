//! Transcript messages.
//!
//! A message is a tagged variant whose concrete shape belongs to the proof
//! system; the session loop only ever looks at [`TranscriptMessage::kind`].
//! Messages are moved, never shared: `receive_message` takes ownership, so a
//! given instance is held by exactly one party at a time.
//!
//! The variants cover the reference spot-check argument and the claim hand-off.
//! Proof systems that live outside this workspace use
//! [`TranscriptMessage::Opaque`] with their own kind tag.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{PublicKey, Signature};

/// Stable discriminant of a [`TranscriptMessage`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Signed data handed to the verifier before a claim exchange.
    Claim,
    /// Verifier asks the prover to open the exchange.
    Begin,
    /// Prover commits to its computation.
    Commitment,
    /// Verifier query.
    Challenge,
    /// Prover answer to a query.
    Opening,
    /// Backend-specific payload.
    Opaque,
}

impl MessageKind {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Begin => "begin",
            Self::Commitment => "commitment",
            Self::Challenge => "challenge",
            Self::Opening => "opening",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of data exchanged during an interactive proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptMessage {
    /// `(data, signature, public_key)` bundle delivered to a fresh verifier.
    Claim {
        /// The claimed data item.
        data: Vec<u8>,
        /// Signature over `data`.
        signature: Signature,
        /// Signer's key.
        public_key: PublicKey,
    },
    /// Opening request carrying the verifier's parameters.
    Begin {
        /// Trace length the verifier expects.
        steps: u32,
        /// Number of random spot checks the verifier will ask for.
        queries: u32,
    },
    /// Commitment to a computation trace.
    Commitment {
        /// Merkle root over the trace values.
        root: [u8; 32],
        /// Trace length.
        steps: u32,
        /// Claimed final value.
        output: [u8; 32],
    },
    /// Query for the transition starting at `index`.
    Challenge {
        /// Trace position `i`; the answer covers `i` and `i + 1`.
        index: u32,
    },
    /// Answer to a [`TranscriptMessage::Challenge`].
    Opening {
        /// Echo of the challenged position.
        index: u32,
        /// Trace value at `index`.
        current: [u8; 32],
        /// Trace value at `index + 1`.
        next: [u8; 32],
        /// Merkle path for `current`.
        current_path: Vec<[u8; 32]>,
        /// Merkle path for `next`.
        next_path: Vec<[u8; 32]>,
    },
    /// Payload of a proof system defined elsewhere.
    Opaque {
        /// Backend-chosen tag for its own dispatch.
        tag: u16,
        /// Encoded payload.
        bytes: Vec<u8>,
    },
}

impl TranscriptMessage {
    /// Stable discriminant; the only thing the session loop inspects.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Claim { .. } => MessageKind::Claim,
            Self::Begin { .. } => MessageKind::Begin,
            Self::Commitment { .. } => MessageKind::Commitment,
            Self::Challenge { .. } => MessageKind::Challenge,
            Self::Opening { .. } => MessageKind::Opening,
            Self::Opaque { .. } => MessageKind::Opaque,
        }
    }
}
