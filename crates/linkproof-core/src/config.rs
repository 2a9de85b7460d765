//! Session configuration.
//!
//! Defaults come from [`SessionConfig::default`]; a TOML profile or the CLI
//! may replace them, and environment variables override last:
//! - `LINKPROOF_MAX_ROUNDS` = `<u32>` (must be > 0)
//!
//! Unparseable values are ignored and logged rather than failing the caller.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable overriding [`SessionConfig::max_rounds`].
pub const ENV_MAX_ROUNDS: &str = "LINKPROOF_MAX_ROUNDS";

/// Default round bound.
pub const DEFAULT_MAX_ROUNDS: u32 = 64;

/// Bounds for one interactive session.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum prover/verifier round trips before the session is abandoned
    /// with [`crate::SessionError::RoundLimit`].
    pub max_rounds: u32,
}

impl Default for SessionConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl SessionConfig {
    /// Config with an explicit round bound.
    #[must_use]
    pub const fn with_max_rounds(max_rounds: u32) -> Self {
        Self { max_rounds }
    }

    /// Merge process-environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|k| std::env::var(k).ok())
    }

    /// Merge overrides from an arbitrary key lookup (env, map, …).
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_ROUNDS) {
            match raw.trim().parse::<u32>() {
                Ok(v) if v > 0 => self.max_rounds = v,
                _ => warn!(var = ENV_MAX_ROUNDS, value = %raw, "ignoring invalid override"),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_and_bad_values_are_ignored() {
        let base = SessionConfig::default();
        assert_eq!(base.max_rounds, DEFAULT_MAX_ROUNDS);

        let c = base.with_overrides(|k| (k == ENV_MAX_ROUNDS).then(|| " 12 ".to_string()));
        assert_eq!(c.max_rounds, 12);

        let c = base.with_overrides(|_| Some("lots".into()));
        assert_eq!(c, base);
        let c = base.with_overrides(|_| Some("0".into()));
        assert_eq!(c, base);
    }

    #[test]
    fn toml_like_partial_input_keeps_defaults() {
        let c: SessionConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(c, SessionConfig::default());
        let c: SessionConfig = serde_json::from_str(r#"{"max_rounds": 5}"#).expect("parse");
        assert_eq!(c.max_rounds, 5);
    }
}
