//! linkproof-core: chain integrity and interactive proof orchestration.
//!
//! This crate defines the **stable boundary** used across linkproof crates:
//! - canonical data types (`Block`, `BlockHash`, `Signature`, `PublicKey`),
//! - the [`Chain`] view and the sequential [`ChainVerifier`],
//! - the [`ClaimVerifier`] (signature check, then an optional proof exchange),
//! - the role traits and the bounded, cancellable [`ProtocolSession`], and
//! - JSON/CBOR chain I/O (with `.jsonl/.ndjson` streaming helpers).
//!
//! Concrete cryptography lives behind [`SignatureVerifier`], [`ProverRole`],
//! [`VerifierRole`] and [`RoleFactory`]; nothing here knows a signature scheme
//! or a proof system.
//!
//! ```no_run
//! use linkproof_core::{BlockChain, ChainVerifier, FnSignatureVerifier, PublicKey, Signature};
//! # let chain = BlockChain::default();
//! let accept_all = FnSignatureVerifier::new(|_: &[u8], _: &Signature, _: &PublicKey| true);
//! let verifier = ChainVerifier::new(accept_all);
//! assert!(verifier.verify_chain(&chain));
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Cooperative cancellation for protocol sessions.
pub mod cancel;
/// Ordered chain view (`len` + `block_at`) and the Vec-backed chain.
pub mod chain;
/// Sequential chain-integrity verification.
pub mod chain_verify;
/// Signature-only and signature-then-proof claim verification.
pub mod claim;
/// Session bounds with environment overrides.
pub mod config;
/// Typed failure reasons behind the boolean verdicts.
pub mod error;
/// JSON/CBOR helpers and auto-detecting read/write APIs for chains.
pub mod io;
/// Transcript messages exchanged between protocol roles.
pub mod message;
/// Prover / Verifier role traits and the role factory.
pub mod role;
/// The interactive-argument driver loop.
pub mod session;
/// The signature capability both verifiers depend on.
pub mod signature;
/// Canonical block, hash, key and signature types.
pub mod types;

pub use cancel::*;
pub use chain::*;
pub use chain_verify::*;
pub use claim::*;
pub use config::*;
pub use error::*;
pub use message::*;
pub use role::*;
pub use session::*;
pub use signature::*;
pub use types::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use linkproof_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        chain::{BlockChain, Chain},
        chain_verify::ChainVerifier,
        claim::ClaimVerifier,
        message::{MessageKind, TranscriptMessage},
        role::{Claim, ProverRole, RoleFactory, VerifierRole},
        session::ProtocolSession,
        signature::SignatureVerifier,
        types::*,
    };
}
