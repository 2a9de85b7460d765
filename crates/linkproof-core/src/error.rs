//! Failure taxonomy.
//!
//! Public verdicts are booleans, but every `false` has one of these reasons
//! behind it so callers (and logs) can tell an invalid signature from a
//! broken link, a rejected proof, or a session that never terminated.

use thiserror::Error;

use crate::message::MessageKind;
use crate::types::BlockHash;

/// Why a chain failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Block `index` carries a signature the backend rejects.
    #[error("invalid signature on block {index}")]
    InvalidSignature {
        /// Position of the offending block.
        index: usize,
    },

    /// Block `index` does not point at its predecessor.
    #[error("broken link at block {index}: previous_hash {found} != predecessor hash {expected}")]
    BrokenLink {
        /// Position of the offending block.
        index: usize,
        /// Hash of block `index - 1`.
        expected: BlockHash,
        /// `previous_hash` stored in block `index`.
        found: BlockHash,
    },

    /// The block source failed before block `index` could be read.
    #[error("reading block {index}: {reason}")]
    Source {
        /// Position that could not be read.
        index: usize,
        /// Rendered source error.
        reason: String,
    },
}

/// A protocol role refused a message or had nothing to say.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// The role was handed a message kind it does not accept in its current state.
    #[error("unexpected {got} message (expected {expected})")]
    UnexpectedMessage {
        /// What the role was waiting for.
        expected: &'static str,
        /// What it received.
        got: MessageKind,
    },

    /// `send_message` was called with no reply pending.
    #[error("role has no message to send")]
    NothingToSend,

    /// The message had the right kind but unusable content.
    #[error("malformed message: {0}")]
    Malformed(String),
}

/// Why an interactive session ended without a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The verifier never reported `done_interacting` within the bound.
    #[error("protocol did not terminate within {max_rounds} rounds")]
    RoundLimit {
        /// Configured bound.
        max_rounds: u32,
    },

    /// The session's cancellation token fired.
    #[error("session cancelled before round {round}")]
    Cancelled {
        /// Rounds completed when cancellation was observed.
        round: u32,
    },

    /// A role failed to send or accept a message.
    #[error(transparent)]
    Role(#[from] RoleError),
}

/// Why a claim failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// The signature over the claimed data is invalid; no proof was attempted.
    #[error("invalid signature over claimed data")]
    InvalidSignature,

    /// The exchange completed and the verifier rejected the proof.
    #[error("proof rejected by verifier")]
    ProofRejected,

    /// The exchange itself failed (role error, round limit, cancellation).
    #[error("proof session failed: {0}")]
    Session(#[from] SessionError),
}

impl From<RoleError> for ClaimError {
    fn from(e: RoleError) -> Self {
        Self::Session(SessionError::Role(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_position() {
        let e = ChainError::BrokenLink {
            index: 2,
            expected: BlockHash([1; 32]),
            found: BlockHash([2; 32]),
        };
        let s = e.to_string();
        assert!(s.contains("block 2"), "{s}");
        assert!(s.contains(&"01".repeat(32)), "{s}");

        let e = SessionError::RoundLimit { max_rounds: 8 };
        assert_eq!(e.to_string(), "protocol did not terminate within 8 rounds");
    }

    #[test]
    fn role_errors_lift_into_claim_errors() {
        let e: ClaimError = RoleError::NothingToSend.into();
        assert_eq!(e, ClaimError::Session(SessionError::Role(RoleError::NothingToSend)));
    }
}
