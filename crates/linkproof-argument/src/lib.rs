// crates/linkproof-argument/src/lib.rs

//! Reference backends for the linkproof verification core.
//!
//! This crate wires concrete (and deliberately small) cryptography into the
//! traits of [`linkproof_core`]:
//!
//! - **Signatures**: [`LamportVerifier`] implements
//!   [`SignatureVerifier`](linkproof_core::SignatureVerifier) over BLAKE3
//!   Lamport one-time keys; [`LamportSigner`] produces matching signatures.
//! - **Demo chains**: [`ChainForge`] seals and signs a linked chain with a
//!   fresh one-time key per block, and can tamper with it for negative tests.
//! - **Spot-check argument**: an interactive argument that the prover knows
//!   the trace of an iterated hash over a data item. The prover commits to the
//!   trace with a Merkle root; the verifier asks for the first and last
//!   transitions plus `queries` random ones and checks each opening.
//!   [`SpotCheckFactory`] hands fresh [`TraceProver`] / [`SpotCheckVerifier`]
//!   pairs to a [`ClaimVerifier`](linkproof_core::ClaimVerifier).
//!
//! ⚠️ These are scaffolding for exercising the core end to end. The
//! spot-check argument is probabilistic and not zero-knowledge; it is not a
//! substitute for a real proof system.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions)]

mod factory;
mod forge;
mod lamport;
pub mod params;
mod prover;
pub mod trace;
mod verifier;

pub use factory::SpotCheckFactory;
pub use forge::ChainForge;
pub use lamport::{LamportSigner, LamportVerifier};
pub use params::ArgumentParams;
pub use prover::TraceProver;
pub use verifier::SpotCheckVerifier;
