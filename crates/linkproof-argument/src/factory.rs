//! Fresh spot-check role pairs for claim verification.

use linkproof_core::{Claim, RoleFactory};
use tracing::debug;

use crate::params::ArgumentParams;
use crate::prover::TraceProver;
use crate::verifier::SpotCheckVerifier;

/// Spawns an honest [`TraceProver`] primed with the claimed data and a
/// [`SpotCheckVerifier`] that learns the claim from the hand-off message.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpotCheckFactory {
    params: ArgumentParams,
}

impl SpotCheckFactory {
    /// Factory using `params` for every pair.
    #[must_use]
    pub const fn new(params: ArgumentParams) -> Self {
        Self { params }
    }

    /// Parameters handed to each pair.
    #[must_use]
    pub const fn params(&self) -> &ArgumentParams {
        &self.params
    }
}

impl RoleFactory for SpotCheckFactory {
    type Prover = TraceProver;
    type Verifier = SpotCheckVerifier;

    fn spawn(&self, claim: &Claim) -> (TraceProver, SpotCheckVerifier) {
        debug!(
            steps = self.params.steps,
            queries = self.params.queries,
            data_len = claim.data.len(),
            "spawning spot-check roles"
        );
        (
            TraceProver::new(&claim.data, self.params.steps),
            SpotCheckVerifier::new(self.params),
        )
    }
}
