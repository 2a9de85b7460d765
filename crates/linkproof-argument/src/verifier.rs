//! Verifier side of the spot-check argument.
//!
//! Phases:
//! ```text
//!   AwaitingClaim ──Claim──▶ AwaitingCommitment ──Commitment──▶ Querying ──(all openings)──▶ Done
//! ```
//! A standalone session starts in `AwaitingCommitment` (see
//! [`SpotCheckVerifier::for_data`]) and opens with a `Begin` message.
//!
//! The query plan is derived from a transcript over the parameters, a fresh
//! nonce, the claim and the commitment, so it is fixed only after the prover
//! has committed.

use linkproof_core::{PublicKey, RoleError, Signature, TranscriptMessage, VerifierRole};
use linkproof_crypto::{Blake3Transcript, Label, MerklePath, MerkleTree, Transcript};
use rand::Rng as _;
use tracing::debug;

use crate::params::{plan_queries, ArgumentParams, DS_SPOT_CHECK};
use crate::trace::{hash_step, seed_value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    AwaitingClaim,
    AwaitingCommitment,
    Querying,
    Done,
}

impl Phase {
    const fn expects(self) -> &'static str {
        match self {
            Self::AwaitingClaim => "claim",
            Self::AwaitingCommitment => "commitment",
            Self::Querying => "opening",
            Self::Done => "nothing",
        }
    }
}

/// Checks a committed iterated-hash trace by random spot checks.
#[derive(Clone, Debug)]
pub struct SpotCheckVerifier {
    params: ArgumentParams,
    nonce: [u8; 32],
    phase: Phase,
    data: Vec<u8>,
    signed_by: Option<(Signature, PublicKey)>,
    root: [u8; 32],
    output: [u8; 32],
    plan: Vec<u32>,
    answered: usize,
    accepted: bool,
}

impl SpotCheckVerifier {
    /// Verifier that first waits for the claim hand-off.
    #[must_use]
    pub fn new(params: ArgumentParams) -> Self {
        Self {
            params,
            nonce: rand::rng().random(),
            phase: Phase::AwaitingClaim,
            data: Vec::new(),
            signed_by: None,
            root: [0u8; 32],
            output: [0u8; 32],
            plan: Vec::new(),
            answered: 0,
            accepted: false,
        }
    }

    /// Verifier that already knows `data` and opens the exchange itself.
    #[must_use]
    pub fn for_data(params: ArgumentParams, data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            phase: Phase::AwaitingCommitment,
            ..Self::new(params)
        }
    }

    /// Replace the random nonce (reproducible query plans in tests).
    #[must_use]
    pub fn with_nonce(mut self, nonce: [u8; 32]) -> Self {
        self.nonce = nonce;
        self
    }

    /// Spot checks passed so far.
    #[must_use]
    pub const fn answered(&self) -> usize {
        self.answered
    }

    /// Total checks planned (0 until the commitment arrives).
    #[must_use]
    pub fn planned(&self) -> usize {
        self.plan.len()
    }

    fn reject(&mut self, reason: &str) {
        debug!(reason, answered = self.answered, "spot check failed");
        self.accepted = false;
        self.phase = Phase::Done;
    }

    fn on_commitment(&mut self, root: [u8; 32], steps: u32, output: [u8; 32]) {
        if steps != self.params.steps {
            self.reject("commitment covers a different trace length");
            return;
        }
        self.root = root;
        self.output = output;

        let mut tr = Blake3Transcript::new(DS_SPOT_CHECK);
        self.params.absorb_into(&mut tr);
        tr.absorb(Label::Nonce.as_str(), &self.nonce);
        tr.absorb(Label::ClaimData.as_str(), &self.data);
        if let Some((sig, pk)) = &self.signed_by {
            tr.absorb(Label::ClaimSignature.as_str(), sig.as_str().as_bytes());
            tr.absorb(Label::ClaimKey.as_str(), pk.as_bytes());
        }
        tr.absorb(Label::TraceRoot.as_str(), &root);
        tr.absorb(Label::TraceOutput.as_str(), &output);

        self.plan = plan_queries(&mut tr, &self.params);
        debug!(queries = self.plan.len(), "commitment accepted, querying");
        self.phase = Phase::Querying;
    }

    fn check_opening(
        &self,
        index: u32,
        current: &[u8; 32],
        next: &[u8; 32],
        current_path: Vec<[u8; 32]>,
        next_path: Vec<[u8; 32]>,
    ) -> Result<(), &'static str> {
        let expected = self.plan.get(self.answered).copied();
        if expected != Some(index) {
            return Err("opening answers a different query");
        }
        let i = index as usize;
        let current_path = MerklePath { siblings: current_path };
        let next_path = MerklePath { siblings: next_path };
        if !MerkleTree::verify(self.root, current, i, &current_path)
            || !MerkleTree::verify(self.root, next, i + 1, &next_path)
        {
            return Err("merkle path does not match the commitment");
        }
        if hash_step(current) != *next {
            return Err("transition is not a hash step");
        }
        if index == 0 && *current != seed_value(&self.data) {
            return Err("trace does not start at the data seed");
        }
        if index + 2 == self.params.steps && *next != self.output {
            return Err("trace does not end at the claimed output");
        }
        Ok(())
    }
}

impl VerifierRole for SpotCheckVerifier {
    fn send_message(&mut self) -> Result<TranscriptMessage, RoleError> {
        match self.phase {
            Phase::AwaitingCommitment => Ok(TranscriptMessage::Begin {
                steps: self.params.steps,
                queries: self.params.queries,
            }),
            Phase::Querying => self
                .plan
                .get(self.answered)
                .map(|&index| TranscriptMessage::Challenge { index })
                .ok_or(RoleError::NothingToSend),
            Phase::AwaitingClaim | Phase::Done => Err(RoleError::NothingToSend),
        }
    }

    fn receive_message(&mut self, msg: TranscriptMessage) -> Result<(), RoleError> {
        match (self.phase, msg) {
            (
                Phase::AwaitingClaim,
                TranscriptMessage::Claim {
                    data,
                    signature,
                    public_key,
                },
            ) => {
                self.data = data;
                self.signed_by = Some((signature, public_key));
                self.phase = Phase::AwaitingCommitment;
            }
            (Phase::AwaitingCommitment, TranscriptMessage::Commitment { root, steps, output }) => {
                self.on_commitment(root, steps, output);
            }
            (
                Phase::Querying,
                TranscriptMessage::Opening {
                    index,
                    current,
                    next,
                    current_path,
                    next_path,
                },
            ) => match self.check_opening(index, &current, &next, current_path, next_path) {
                Ok(()) => {
                    self.answered += 1;
                    if self.answered == self.plan.len() {
                        self.accepted = true;
                        self.phase = Phase::Done;
                    }
                }
                Err(reason) => self.reject(reason),
            },
            (phase, other) => {
                return Err(RoleError::UnexpectedMessage {
                    expected: phase.expects(),
                    got: other.kind(),
                })
            }
        }
        Ok(())
    }

    fn done_interacting(&self) -> bool {
        self.phase == Phase::Done
    }

    fn verify(&self) -> bool {
        self.phase == Phase::Done && self.accepted && self.answered == self.plan.len()
    }
}
