//! Interactive-argument driver.
//!
//! ```text
//!   verifier ──send──▶ [in flight] ──▶ prover.receive
//!                                      prover.send ──▶ verifier.receive
//!   (repeat while !verifier.done_interacting())
//!   verdict = verifier.verify()
//! ```
//!
//! Exactly one message is in flight at a time. It sits in an `Option` slot
//! and is `take()`n on every hand-off, so no message is ever reachable from
//! both roles. The verifier opens the exchange once, before the loop; after
//! absorbing each prover response it supplies the next in-flight message
//! only if it still wants another round. The prover's response is never
//! handed back to the prover, so every message has one sender and one
//! receiver.
//!
//! The loop is bounded by [`SessionConfig::max_rounds`] and checks its
//! [`CancellationToken`] once per round.

use tracing::{debug, trace};

use crate::cancel::CancellationToken;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::message::TranscriptMessage;
use crate::role::{ProverRole, VerifierRole};

/// How a completed session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// `verifier.verify()` after the last round.
    pub verdict: bool,
    /// Prover round trips performed.
    pub rounds: u32,
}

/// Drives one Prover/Verifier exchange to a verdict.
#[derive(Debug, Clone, Default)]
pub struct ProtocolSession {
    config: SessionConfig,
    cancel: CancellationToken,
}

impl ProtocolSession {
    /// Session with the given bounds and a private cancellation token.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Share an external cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Active bounds.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Handle that cancels this session when fired.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run to completion and return the verifier's verdict.
    pub fn run_interaction<P, V>(&self, prover: &mut P, verifier: &mut V) -> Result<bool, SessionError>
    where
        P: ProverRole + ?Sized,
        V: VerifierRole + ?Sized,
    {
        self.run(prover, verifier).map(|o| o.verdict)
    }

    /// Run to completion, reporting the verdict and the number of rounds.
    pub fn run<P, V>(&self, prover: &mut P, verifier: &mut V) -> Result<SessionOutcome, SessionError>
    where
        P: ProverRole + ?Sized,
        V: VerifierRole + ?Sized,
    {
        let mut in_flight: Option<TranscriptMessage> = Some(verifier.send_message()?);
        let mut rounds: u32 = 0;

        while !verifier.done_interacting() {
            if self.cancel.is_cancelled() {
                debug!(round = rounds, "session cancelled");
                return Err(SessionError::Cancelled { round: rounds });
            }
            if rounds >= self.config.max_rounds {
                debug!(max_rounds = self.config.max_rounds, "round limit reached");
                return Err(SessionError::RoundLimit {
                    max_rounds: self.config.max_rounds,
                });
            }

            let challenge = match in_flight.take() {
                Some(msg) => msg,
                None => verifier.send_message()?,
            };
            trace!(round = rounds, kind = %challenge.kind(), "verifier -> prover");
            prover.receive_message(challenge)?;

            let response = prover.send_message()?;
            trace!(round = rounds, kind = %response.kind(), "prover -> verifier");
            verifier.receive_message(response)?;

            rounds += 1;
        }

        let verdict = verifier.verify();
        debug!(rounds, verdict, "session finished");
        Ok(SessionOutcome { verdict, rounds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoleError;

    /// Prover that echoes challenges back as openings.
    #[derive(Default)]
    struct Echo {
        pending: Option<u32>,
    }

    impl ProverRole for Echo {
        fn receive_message(&mut self, msg: TranscriptMessage) -> Result<(), RoleError> {
            match msg {
                TranscriptMessage::Challenge { index } => {
                    self.pending = Some(index);
                    Ok(())
                }
                other => Err(RoleError::UnexpectedMessage {
                    expected: "challenge",
                    got: other.kind(),
                }),
            }
        }

        fn send_message(&mut self) -> Result<TranscriptMessage, RoleError> {
            let index = self.pending.take().ok_or(RoleError::NothingToSend)?;
            Ok(TranscriptMessage::Challenge { index })
        }
    }

    /// Verifier that wants `target` echoes back in order.
    struct Counter {
        next: u32,
        target: u32,
        ok: bool,
    }

    impl VerifierRole for Counter {
        fn send_message(&mut self) -> Result<TranscriptMessage, RoleError> {
            Ok(TranscriptMessage::Challenge { index: self.next })
        }

        fn receive_message(&mut self, msg: TranscriptMessage) -> Result<(), RoleError> {
            self.ok &= msg == TranscriptMessage::Challenge { index: self.next };
            self.next += 1;
            Ok(())
        }

        fn done_interacting(&self) -> bool {
            self.next >= self.target
        }

        fn verify(&self) -> bool {
            self.ok
        }
    }

    #[test]
    fn runs_until_verifier_is_done() {
        let session = ProtocolSession::new(SessionConfig::with_max_rounds(10));
        let mut p = Echo::default();
        let mut v = Counter { next: 0, target: 4, ok: true };
        let out = session.run(&mut p, &mut v).expect("terminates");
        assert_eq!(out, SessionOutcome { verdict: true, rounds: 4 });
    }

    #[test]
    fn round_limit_surfaces_as_error() {
        let session = ProtocolSession::new(SessionConfig::with_max_rounds(3));
        let mut p = Echo::default();
        let mut v = Counter { next: 0, target: u32::MAX, ok: true };
        assert_eq!(
            session.run_interaction(&mut p, &mut v),
            Err(SessionError::RoundLimit { max_rounds: 3 })
        );
    }

    #[test]
    fn prover_errors_propagate() {
        struct Mute;
        impl ProverRole for Mute {
            fn receive_message(&mut self, _: TranscriptMessage) -> Result<(), RoleError> {
                Ok(())
            }
            fn send_message(&mut self) -> Result<TranscriptMessage, RoleError> {
                Err(RoleError::NothingToSend)
            }
        }
        let session = ProtocolSession::default();
        let mut v = Counter { next: 0, target: 1, ok: true };
        assert_eq!(
            session.run_interaction(&mut Mute, &mut v),
            Err(SessionError::Role(RoleError::NothingToSend))
        );
    }
}
