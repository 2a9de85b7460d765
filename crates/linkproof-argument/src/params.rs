//! Spot-check parameters, transcript labels and challenge derivation.
//!
//! These are the only knobs the prover and verifier read. Defaults may be
//! replaced by a TOML profile or CLI flags; environment variables override:
//! - `LINKPROOF_STEPS`   = `<u32>` (>= 2)
//! - `LINKPROOF_QUERIES` = `<u32>`
//!
//! [`ArgumentParams::validate_for`] also checks that a session bounded by a
//! given [`SessionConfig`] has room for every round an honest run needs.

use anyhow::{ensure, Result};
use linkproof_core::SessionConfig;
use linkproof_crypto::{Label, Transcript};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable overriding [`ArgumentParams::steps`].
pub const ENV_STEPS: &str = "LINKPROOF_STEPS";

/// Environment variable overriding [`ArgumentParams::queries`].
pub const ENV_QUERIES: &str = "LINKPROOF_QUERIES";

/// Default trace length.
pub const DEFAULT_STEPS: u32 = 64;

/// Default number of random spot checks (on top of the two boundary checks).
pub const DEFAULT_QUERIES: u32 = 8;

/// Largest accepted trace length. The prover holds the whole trace and its
/// Merkle tree in memory.
pub const MAX_STEPS: u32 = 1 << 20;

/// Largest accepted number of random spot checks.
pub const MAX_QUERIES: u32 = 1 << 12;

/// Top-level transcript domain for the spot-check argument.
pub const DS_SPOT_CHECK: &str = "linkproof/spot-check/v1";

/// Public parameters both roles agree on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentParams {
    /// Trace length (number of values, so `steps - 1` transitions).
    pub steps: u32,
    /// Random transitions checked besides the first and last.
    pub queries: u32,
}

impl Default for ArgumentParams {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            queries: DEFAULT_QUERIES,
        }
    }
}

impl ArgumentParams {
    /// Explicit parameters (unchecked; see [`Self::validate`]).
    #[must_use]
    pub const fn new(steps: u32, queries: u32) -> Self {
        Self { steps, queries }
    }

    /// Reject parameters the roles cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.steps >= 2, "steps must be >= 2 (got {})", self.steps);
        ensure!(
            self.steps <= MAX_STEPS,
            "steps must be <= {MAX_STEPS} (got {})",
            self.steps
        );
        ensure!(
            self.queries <= MAX_QUERIES,
            "queries must be <= {MAX_QUERIES} (got {})",
            self.queries
        );
        Ok(())
    }

    /// Session rounds an honest exchange may take: one for the commitment,
    /// then one per planned query (two boundary checks plus `queries`).
    #[must_use]
    pub const fn rounds_needed(&self) -> u32 {
        self.queries.saturating_add(3)
    }

    /// [`Self::validate`], plus a check that `session` allows
    /// [`Self::rounds_needed`] rounds. Without it an honest prover would be
    /// cut off with a round-limit error.
    pub fn validate_for(&self, session: &SessionConfig) -> Result<()> {
        self.validate()?;
        ensure!(
            session.max_rounds >= self.rounds_needed(),
            "max_rounds {} is below the {} rounds needed for {} queries",
            session.max_rounds,
            self.rounds_needed(),
            self.queries
        );
        Ok(())
    }

    /// Merge process-environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|k| std::env::var(k).ok())
    }

    /// Merge overrides from an arbitrary key lookup.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_STEPS) {
            match raw.trim().parse::<u32>() {
                Ok(v) if v >= 2 => self.steps = v,
                _ => warn!(var = ENV_STEPS, value = %raw, "ignoring invalid override"),
            }
        }
        if let Some(raw) = lookup(ENV_QUERIES) {
            match raw.trim().parse::<u32>() {
                Ok(v) => self.queries = v,
                Err(_) => warn!(var = ENV_QUERIES, value = %raw, "ignoring invalid override"),
            }
        }
        self
    }

    /// Absorb both parameters under [`Label::Params`].
    pub fn absorb_into<T: Transcript>(&self, tr: &mut T) {
        tr.absorb_u64(Label::Params.as_str(), u64::from(self.steps));
        tr.absorb_u64(Label::Params.as_str(), u64::from(self.queries));
    }
}

/// Transition indices the verifier will challenge, in order.
///
/// The first and last transitions (`0` and `steps - 2`) come first so that
/// both boundary constraints are always checked; `queries` transcript-derived
/// positions in `0..steps - 1` follow. Requires `steps >= 2`.
#[must_use]
pub fn plan_queries<T: Transcript>(tr: &mut T, params: &ArgumentParams) -> Vec<u32> {
    let transitions = params.steps.saturating_sub(1).max(1);
    let last = transitions - 1;

    let mut out = Vec::with_capacity(params.queries as usize + 2);
    out.push(0);
    if last != 0 {
        out.push(last);
    }
    for _ in 0..params.queries {
        let i = tr.challenge_index(Label::Query.as_str(), u64::from(transitions));
        // `i < transitions <= u32::MAX`
        out.push(u32::try_from(i).unwrap_or(last));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkproof_crypto::Blake3Transcript;

    #[test]
    fn overrides_respect_bounds() {
        let p = ArgumentParams::default().with_overrides(|k| match k {
            ENV_STEPS => Some("1".into()),
            ENV_QUERIES => Some("3".into()),
            _ => None,
        });
        assert_eq!(p.steps, DEFAULT_STEPS);
        assert_eq!(p.queries, 3);
        assert!(ArgumentParams::new(1, 0).validate().is_err());
        assert!(ArgumentParams::new(2, 0).validate().is_ok());
    }

    #[test]
    fn oversized_parameters_are_refused() {
        assert!(ArgumentParams::new(MAX_STEPS, MAX_QUERIES).validate().is_ok());
        assert!(ArgumentParams::new(MAX_STEPS + 1, 0).validate().is_err());
        assert!(ArgumentParams::new(16, MAX_QUERIES + 1).validate().is_err());
        assert!(ArgumentParams::new(16, u32::MAX).validate().is_err());
        assert_eq!(ArgumentParams::new(16, u32::MAX).rounds_needed(), u32::MAX);
    }

    #[test]
    fn round_budget_must_cover_the_query_plan() {
        let session = SessionConfig::default();
        let fits = ArgumentParams::new(16, session.max_rounds - 3);
        assert_eq!(fits.rounds_needed(), session.max_rounds);
        assert!(fits.validate_for(&session).is_ok());

        let err = ArgumentParams::new(16, session.max_rounds - 2)
            .validate_for(&session)
            .unwrap_err();
        assert!(err.to_string().contains("max_rounds 64"), "{err}");
    }

    #[test]
    fn plan_starts_with_boundaries_and_stays_in_range() {
        let params = ArgumentParams::new(10, 16);
        let mut tr = Blake3Transcript::new(DS_SPOT_CHECK);
        let plan = plan_queries(&mut tr, &params);
        assert_eq!(plan.len(), 18);
        assert_eq!(&plan[..2], &[0, 8]);
        assert!(plan.iter().all(|&i| i < 9));
    }

    #[test]
    fn two_step_trace_has_a_single_boundary_query() {
        let mut tr = Blake3Transcript::new(DS_SPOT_CHECK);
        let plan = plan_queries(&mut tr, &ArgumentParams::new(2, 2));
        assert_eq!(plan, vec![0, 0, 0]);
    }
}
