// crates/linkproof-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

mod profile;

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use linkproof_argument::{
    ChainForge, LamportSigner, LamportVerifier, SpotCheckFactory, SpotCheckVerifier, TraceProver,
};
use linkproof_core::{
    io::{read_chain_auto, stream_chain_auto, write_chain_auto},
    CancellationToken, ChainVerifier, ClaimVerifier, ProtocolSession, PublicKey,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::profile::{ClaimBundle, Overrides, Profile};

#[derive(Parser, Debug)]
#[command(
    name = "linkproof",
    about = "linkproof reference CLI",
    long_about = "linkproof reference CLI.\n\nForge and verify signed block chains, sign data items, and run interactive claim proofs with the reference backends.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    tuning: Tuning,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Options shared by every command that runs a session.
#[derive(Args, Debug)]
struct Tuning {
    /// TOML profile with `[session]` and `[argument]` tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Round bound for interactive sessions (>0)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    max_rounds: Option<u32>,

    /// Trace length for the spot-check argument (>=2)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(2..))]
    steps: Option<u32>,

    /// Random spot checks besides the two boundary checks
    #[arg(long, global = true)]
    queries: Option<u32>,
}

impl Tuning {
    fn profile(&self) -> Result<Profile> {
        Profile::resolve(
            self.config.as_deref(),
            Overrides {
                max_rounds: self.max_rounds,
                steps: self.steps,
                queries: self.queries,
            },
        )
    }
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Derive a Lamport key pair from a seed and write the public key
    Keygen {
        /// Seed string (keys are one-time; use a fresh seed per signature)
        #[arg(long)]
        seed: String,

        /// Output path for the public key (JSON)
        #[arg(long, default_value = "key.json")]
        out: PathBuf,
    },

    /// Build a signed demo chain (JSON/CBOR/JSONL by extension)
    ForgeChain {
        /// Seed from which per-block keys derive
        #[arg(long, default_value = "linkproof-demo")]
        seed: String,

        /// Number of blocks
        #[arg(long, default_value_t = 8)]
        len: usize,

        /// Point block i (>=1) at the wrong predecessor
        #[arg(long)]
        tamper_link: Option<usize>,

        /// Replace block i's signature with one over other data
        #[arg(long)]
        tamper_sig: Option<usize>,

        /// Output chain path
        #[arg(long, default_value = "chain.json")]
        out: PathBuf,
    },

    /// Verify signatures and linkage of a chain file; exits non-zero on failure
    VerifyChain {
        /// Input chain path (JSON/CBOR/JSONL)
        #[arg(long)]
        chain: PathBuf,

        /// Walk the file block by block instead of loading it.
        /// Effective with `.jsonl` inputs; `.json`/`.cbor` are loaded first.
        #[arg(long, default_value_t = false)]
        stream: bool,
    },

    /// Sign a data file and write a claim bundle
    Sign {
        /// Seed for the one-time signing key
        #[arg(long)]
        seed: String,

        /// File whose bytes are signed
        #[arg(long)]
        data: PathBuf,

        /// Output path for the claim bundle (JSON)
        #[arg(long, default_value = "claim.json")]
        out: PathBuf,
    },

    /// Verify a claim bundle's signature, optionally followed by a proof exchange
    VerifyClaim {
        /// Claim bundle produced by `sign`
        #[arg(long)]
        bundle: PathBuf,

        /// Also run the spot-check argument over the data
        #[arg(long, default_value_t = false)]
        with_proof: bool,
    },

    /// Run a standalone interactive session (verifier speaks first)
    DemoProtocol {
        /// Data item the computation runs over
        #[arg(long, default_value = "hello, linkproof")]
        data: String,

        /// Corrupt this trace position in the prover's witness
        #[arg(long)]
        tamper_at: Option<usize>,

        /// Cancel the session if it is still running after this many milliseconds
        #[arg(long)]
        deadline_ms: Option<u64>,
    },
}

/// On-disk public key.
#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    scheme: String,
    public_key: PublicKey,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Keygen { seed, out } => keygen(&seed, &out),

        Cmd::ForgeChain {
            seed,
            len,
            tamper_link,
            tamper_sig,
            out,
        } => forge_chain(&seed, len, tamper_link, tamper_sig, &out),

        Cmd::VerifyChain { chain, stream } => verify_chain(&chain, stream),

        Cmd::Sign { seed, data, out } => sign(&seed, &data, &out),

        Cmd::VerifyClaim { bundle, with_proof } => {
            verify_claim(&bundle, with_proof, &cli.tuning.profile()?)
        }

        Cmd::DemoProtocol {
            data,
            tamper_at,
            deadline_ms,
        } => demo_protocol(&data, tamper_at, deadline_ms, &cli.tuning.profile()?),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let s = serde_json::to_string_pretty(value).context("serialize JSON")?;
    std::fs::write(path, s).with_context(|| format!("write {}", path.display()))
}

/// First bytes of a key or signature, for human-readable output.
fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(8)])
}

fn keygen(seed: &str, out: &Path) -> Result<()> {
    let signer = LamportSigner::from_seed(seed.as_bytes());
    let pk = signer.public_key();
    write_json(
        out,
        &KeyFile {
            scheme: "lamport-blake3".into(),
            public_key: pk.clone(),
        },
    )?;
    println!(
        "Public key {}… ({} bytes) → {}",
        fingerprint(pk.as_bytes()),
        pk.as_bytes().len(),
        out.display()
    );
    Ok(())
}

fn forge_chain(
    seed: &str,
    len: usize,
    tamper_link: Option<usize>,
    tamper_sig: Option<usize>,
    out: &Path,
) -> Result<()> {
    info!(len, out=%out.display(), "forging chain");
    let forge = ChainForge::new(seed.as_bytes());
    let mut chain = forge.forge(len);

    if let Some(i) = tamper_link {
        ChainForge::tamper_link(&mut chain, i)?;
        warn!(index = i, "broke linkage");
    }
    if let Some(i) = tamper_sig {
        forge.tamper_signature(&mut chain, i)?;
        warn!(index = i, "replaced signature");
    }

    write_chain_auto(out, &chain)
        .with_context(|| format!("writing chain to {}", out.display()))?;
    println!("Forged {len} blocks (tip {}) → {}", chain.tip_hash(), out.display());
    Ok(())
}

fn verify_chain(path: &Path, stream: bool) -> Result<()> {
    info!(chain=%path.display(), stream, "verifying chain");
    let v = ChainVerifier::new(LamportVerifier);

    let report = if stream {
        let blocks = stream_chain_auto(path).context("open chain stream")?;
        v.check_stream(blocks)
    } else {
        let chain = read_chain_auto(path)
            .with_context(|| format!("reading chain from {}", path.display()))?;
        v.check_chain(&chain)
    }
    .with_context(|| format!("chain {} failed verification", path.display()))?;

    match report.tip {
        Some(tip) => println!("OK: {} blocks verified, tip {tip}", report.blocks_checked),
        None => println!("OK: empty chain"),
    }
    Ok(())
}

fn sign(seed: &str, data: &Path, out: &Path) -> Result<()> {
    let bytes = std::fs::read(data).with_context(|| format!("read {}", data.display()))?;
    let signer = LamportSigner::from_seed(seed.as_bytes());
    let bundle = ClaimBundle {
        data: hex::encode(&bytes),
        signature: signer.sign(&bytes),
        public_key: signer.public_key(),
    };
    write_json(out, &bundle)?;
    println!(
        "Signed {} ({} bytes), signature {}… → {}",
        data.display(),
        bytes.len(),
        bundle.signature.as_str().chars().take(16).collect::<String>(),
        out.display()
    );
    Ok(())
}

fn verify_claim(path: &Path, with_proof: bool, prof: &Profile) -> Result<()> {
    let src = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let bundle: ClaimBundle = serde_json::from_str(&src).context("parse claim bundle")?;
    let data = bundle.data_bytes()?;

    info!(bundle=%path.display(), with_proof, steps = prof.argument.steps, queries = prof.argument.queries, "verifying claim");
    let cv = ClaimVerifier::new(
        LamportVerifier,
        SpotCheckFactory::new(prof.argument),
        prof.session,
    );

    if with_proof {
        cv.check_with_proof(&data, &bundle.signature, &bundle.public_key)
            .context("claim verification failed")?;
        println!("OK: signature valid and proof accepted");
    } else {
        if !cv.verify_signature_only(&data, &bundle.signature, &bundle.public_key) {
            bail!("claim verification failed: invalid signature over claimed data");
        }
        println!("OK: signature valid");
    }
    Ok(())
}

/// Cancel `token` from a background thread once `after` has elapsed.
fn spawn_deadline(token: CancellationToken, after: Duration) -> JoinHandle<()> {
    std::thread::spawn(move || {
        std::thread::sleep(after);
        if !token.is_cancelled() {
            warn!(after_ms = after.as_millis(), "deadline reached, cancelling session");
        }
        token.cancel();
    })
}

fn demo_protocol(
    data: &str,
    tamper_at: Option<usize>,
    deadline_ms: Option<u64>,
    prof: &Profile,
) -> Result<()> {
    let params = prof.argument;
    let mut prover = match tamper_at {
        Some(i) => TraceProver::tampered(data.as_bytes(), params.steps, i),
        None => TraceProver::new(data.as_bytes(), params.steps),
    };
    let mut verifier = SpotCheckVerifier::for_data(params, data.as_bytes());

    let token = CancellationToken::new();
    if let Some(ms) = deadline_ms {
        spawn_deadline(token.clone(), Duration::from_millis(ms));
    }

    info!(steps = params.steps, queries = params.queries, max_rounds = prof.session.max_rounds, "running session");
    let session = ProtocolSession::new(prof.session).with_cancellation(token);
    let out = session
        .run(&mut prover, &mut verifier)
        .context("session did not reach a verdict")?;

    println!(
        "Session finished after {} rounds ({} of {} checks passed): {}",
        out.rounds,
        verifier.answered(),
        verifier.planned(),
        if out.verdict { "ACCEPT" } else { "REJECT" }
    );
    if !out.verdict {
        bail!("verifier rejected the proof");
    }
    Ok(())
}
