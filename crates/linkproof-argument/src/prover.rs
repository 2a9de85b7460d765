//! Prover side of the spot-check argument.

use linkproof_core::{ProverRole, RoleError, TranscriptMessage};
use tracing::trace;

use crate::trace::{compute_trace, CommittedTrace};

/// What the prover will say on its next `send_message`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Commitment,
    Opening(u32),
    Nothing,
}

/// Holds the full trace as its witness and answers queries against it.
///
/// A fresh prover has its commitment ready, so it can open a claim exchange
/// without being asked; a `Begin` from the verifier is accepted as a no-op
/// request for that same commitment.
#[derive(Clone, Debug)]
pub struct TraceProver {
    steps: u32,
    trace: CommittedTrace,
    pending: Pending,
}

impl TraceProver {
    /// Honest prover for `data` with a trace of `steps` values.
    #[must_use]
    pub fn new(data: &[u8], steps: u32) -> Self {
        Self::from_values(steps, compute_trace(data, steps))
    }

    /// Prover whose trace value at `corrupt_at` is replaced by garbage before
    /// committing. Used to exercise rejection paths.
    #[must_use]
    pub fn tampered(data: &[u8], steps: u32, corrupt_at: usize) -> Self {
        let mut values = compute_trace(data, steps);
        if let Some(v) = values.get_mut(corrupt_at) {
            v.iter_mut().for_each(|b| *b ^= 0xff);
        }
        Self::from_values(steps, values)
    }

    fn from_values(steps: u32, values: Vec<[u8; 32]>) -> Self {
        Self {
            steps,
            trace: CommittedTrace::new(values),
            pending: Pending::Commitment,
        }
    }

    fn opening(&self, index: u32) -> Result<TranscriptMessage, RoleError> {
        let i = index as usize;
        let (current, current_path) = self
            .trace
            .open(i)
            .ok_or_else(|| RoleError::Malformed(format!("challenge {index} out of range")))?;
        let (next, next_path) = self
            .trace
            .open(i + 1)
            .ok_or_else(|| RoleError::Malformed(format!("challenge {index} out of range")))?;
        Ok(TranscriptMessage::Opening {
            index,
            current,
            next,
            current_path,
            next_path,
        })
    }
}

impl ProverRole for TraceProver {
    fn receive_message(&mut self, msg: TranscriptMessage) -> Result<(), RoleError> {
        match msg {
            TranscriptMessage::Begin { steps, .. } => {
                if steps != self.steps {
                    return Err(RoleError::Malformed(format!(
                        "verifier expects {steps} steps, prover holds {}",
                        self.steps
                    )));
                }
                self.pending = Pending::Commitment;
            }
            TranscriptMessage::Challenge { index } => {
                trace!(index, "challenge received");
                self.pending = Pending::Opening(index);
            }
            other => {
                return Err(RoleError::UnexpectedMessage {
                    expected: "begin or challenge",
                    got: other.kind(),
                })
            }
        }
        Ok(())
    }

    fn send_message(&mut self) -> Result<TranscriptMessage, RoleError> {
        match std::mem::replace(&mut self.pending, Pending::Nothing) {
            Pending::Commitment => {
                let output = self.trace.output().ok_or(RoleError::NothingToSend)?;
                Ok(TranscriptMessage::Commitment {
                    root: self.trace.root(),
                    steps: self.steps,
                    output,
                })
            }
            Pending::Opening(index) => self.opening(index),
            Pending::Nothing => Err(RoleError::NothingToSend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkproof_core::MessageKind;

    #[test]
    fn commits_first_then_answers_challenges() {
        let mut p = TraceProver::new(b"data", 4);
        let c = p.send_message().expect("commitment");
        assert_eq!(c.kind(), MessageKind::Commitment);
        assert_eq!(p.send_message(), Err(RoleError::NothingToSend));

        p.receive_message(TranscriptMessage::Challenge { index: 2 }).expect("accept");
        match p.send_message().expect("opening") {
            TranscriptMessage::Opening { index, .. } => assert_eq!(index, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn out_of_range_challenge_is_malformed() {
        let mut p = TraceProver::new(b"data", 4);
        p.receive_message(TranscriptMessage::Challenge { index: 3 }).expect("accept");
        assert!(matches!(p.send_message(), Err(RoleError::Malformed(_))));
    }

    #[test]
    fn rejects_messages_meant_for_the_verifier() {
        let mut p = TraceProver::new(b"data", 4);
        let err = p
            .receive_message(TranscriptMessage::Opaque { tag: 1, bytes: vec![] })
            .unwrap_err();
        assert_eq!(
            err,
            RoleError::UnexpectedMessage { expected: "begin or challenge", got: MessageKind::Opaque }
        );
        assert!(p
            .receive_message(TranscriptMessage::Begin { steps: 5, queries: 1 })
            .is_err());
    }
}
