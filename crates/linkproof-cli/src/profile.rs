// crates/linkproof-cli/src/profile.rs

//! Run profile: session bounds and argument parameters.
//!
//! Precedence, lowest first: built-in defaults, `--config <toml>`,
//! `LINKPROOF_*` environment variables, explicit CLI flags.
//!
//! ```toml
//! [session]
//! max_rounds = 32
//!
//! [argument]
//! steps = 128
//! queries = 12
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use linkproof_argument::ArgumentParams;
use linkproof_core::{PublicKey, SessionConfig, Signature};
use serde::{Deserialize, Serialize};

/// Everything a command needs to configure verification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub session: SessionConfig,
    pub argument: ArgumentParams,
}

/// Flag values that override the profile when present.
#[derive(Clone, Copy, Debug, Default)]
pub struct Overrides {
    pub max_rounds: Option<u32>,
    pub steps: Option<u32>,
    pub queries: Option<u32>,
}

impl Profile {
    /// Parse a TOML profile.
    pub fn from_toml(src: &str) -> Result<Self> {
        toml::from_str(src).context("parse profile toml")
    }

    /// Load defaults, then the optional file, then env, then flags.
    ///
    /// Fails when the argument parameters are out of range or need more
    /// rounds than the session allows.
    pub fn resolve(config: Option<&Path>, flags: Overrides) -> Result<Self> {
        let base = match config {
            Some(p) => {
                let src = std::fs::read_to_string(p)
                    .with_context(|| format!("read profile {}", p.display()))?;
                Self::from_toml(&src)?
            }
            None => Self::default(),
        };
        let mut prof = Self {
            session: base.session.with_env_overrides(),
            argument: base.argument.with_env_overrides(),
        };
        prof.apply(flags);
        prof.argument.validate_for(&prof.session)?;
        Ok(prof)
    }

    fn apply(&mut self, flags: Overrides) {
        if let Some(v) = flags.max_rounds {
            self.session.max_rounds = v;
        }
        if let Some(v) = flags.steps {
            self.argument.steps = v;
        }
        if let Some(v) = flags.queries {
            self.argument.queries = v;
        }
    }
}

/// A signed data item as exchanged on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimBundle {
    /// Data bytes, hex-encoded.
    pub data: String,
    pub signature: Signature,
    pub public_key: PublicKey,
}

impl ClaimBundle {
    /// Decoded data bytes.
    pub fn data_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.data).context("claim bundle data is not hex")
    }
}
