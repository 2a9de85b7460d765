//! Serialization helpers for chains.
//!
//! JSON and CBOR read/write utilities with extension-based auto-detection.
//! Unknown/missing extensions are rejected for reads and default to JSON
//! for writes. `.jsonl` / `.ndjson` files hold one block per line and can be
//! verified without materializing the chain (see
//! [`ChainVerifier::check_stream`](crate::ChainVerifier::check_stream)).

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::chain::BlockChain;
use crate::types::Block;

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Read a chain from **JSON** (an array of blocks).
pub fn read_chain_json<P: AsRef<Path>>(path: P) -> Result<BlockChain> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).context("deserialize JSON chain")
}

/// Write a chain to **JSON** (pretty).
pub fn write_chain_json<P: AsRef<Path>>(path: P, chain: &BlockChain) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, chain).context("serialize JSON chain")?;
    w.flush()?;
    Ok(())
}

/// Read a chain from **CBOR**.
pub fn read_chain_cbor<P: AsRef<Path>>(path: P) -> Result<BlockChain> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    ciborium::de::from_reader(BufReader::new(f)).context("deserialize CBOR chain")
}

/// Write a chain to **CBOR**.
pub fn write_chain_cbor<P: AsRef<Path>>(path: P, chain: &BlockChain) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(chain, &mut w).context("serialize CBOR chain")?;
    w.flush()?;
    Ok(())
}

/// Write a chain as **JSON Lines** (one block per line).
pub fn write_chain_jsonl<P: AsRef<Path>>(path: P, chain: &BlockChain) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for b in chain {
        serde_json::to_writer(&mut w, b).context("serialize block to JSON line")?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

/// Auto-detect read by extension `.json` / `.cbor` / `.jsonl` / `.ndjson`.
pub fn read_chain_auto<P: AsRef<Path>>(path: P) -> Result<BlockChain> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_chain_json(path),
        Some("cbor") => read_chain_cbor(path),
        Some("jsonl" | "ndjson") => stream_chain_jsonl(path)?.collect(),
        Some(other) => Err(anyhow!(
            "unsupported chain extension: {other} (supported: .json, .cbor, .jsonl, .ndjson)"
        )),
        None => Err(anyhow!("path has no extension (expected .json, .cbor or .jsonl)")),
    }
}

/// Auto-detect write (defaults to **JSON** if unknown or missing).
pub fn write_chain_auto<P: AsRef<Path>>(path: P, chain: &BlockChain) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_chain_cbor(path, chain),
        Some("jsonl" | "ndjson") => write_chain_jsonl(path, chain),
        _ => write_chain_json(path, chain),
    }
}

/// Owning JSONL iterator over blocks.
///
/// Holds the buffered reader internally so the iterator can outlive the
/// call that opened it. Blank lines are reported as errors with their line
/// number rather than skipped.
pub struct JsonlBlockIter {
    rdr: BufReader<File>,
    buf: String,
    line_no: usize,
}

impl Iterator for JsonlBlockIter {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.rdr.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let line = self.buf.trim_end_matches(['\n', '\r']);
                if line.is_empty() {
                    return Some(Err(anyhow!("parse jsonl line {}: empty line", self.line_no)));
                }
                Some(
                    serde_json::from_str(line)
                        .with_context(|| format!("parse jsonl line {}", self.line_no)),
                )
            }
            Err(e) => Some(Err(e).with_context(|| format!("read line {}", self.line_no + 1))),
        }
    }
}

/// Stream blocks from a JSONL file, one at a time.
pub fn stream_chain_jsonl<P: AsRef<Path>>(path: P) -> Result<JsonlBlockIter> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(JsonlBlockIter {
        rdr: BufReader::new(f),
        buf: String::with_capacity(8 << 10),
        line_no: 0,
    })
}

/// Boxed block stream for any supported extension.
///
/// - **`.jsonl` / `.ndjson`**: true streaming.
/// - **`.json` / `.cbor`**: load the chain, then iterate.
pub fn stream_chain_auto<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn Iterator<Item = Result<Block>> + Send>> {
    let pb = path.as_ref().to_owned();
    match ext_lower(&pb).as_deref() {
        Some("jsonl" | "ndjson") => Ok(Box::new(stream_chain_jsonl(pb)?)),
        Some("json" | "cbor") => {
            let chain = read_chain_auto(&pb)?;
            Ok(Box::new(chain.into_blocks().into_iter().map(Ok)))
        }
        Some(other) => Err(anyhow!("unsupported chain extension: {other}")),
        None => Err(anyhow!("path has no extension (expected .json, .cbor or .jsonl)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlockHash, PublicKey, Signature};

    fn sample() -> BlockChain {
        let a = Block::seal(BlockHash::ZERO, b"genesis".to_vec(), PublicKey(vec![1; 4]))
            .with_signature(Signature::from_bytes(&[2; 4]));
        let b = Block::seal(a.hash, b"next".to_vec(), PublicKey(vec![3; 4]))
            .with_signature(Signature::from_bytes(&[4; 4]));
        BlockChain::from(vec![a, b])
    }

    #[test]
    fn every_format_reads_back_the_same_chain() {
        let dir = tempfile::tempdir().expect("tempdir");
        let chain = sample();
        for name in ["c.json", "c.cbor", "c.jsonl", "nested/c.ndjson"] {
            let p = dir.path().join(name);
            write_chain_auto(&p, &chain).expect("write");
            assert_eq!(read_chain_auto(&p).expect("read"), chain, "{name}");
            let streamed: Vec<Block> = stream_chain_auto(&p)
                .expect("stream")
                .collect::<Result<_>>()
                .expect("items");
            assert_eq!(streamed, chain.clone().into_blocks(), "{name}");
        }
    }

    #[test]
    fn blank_jsonl_line_is_reported_with_its_number() {
        let dir = tempfile::tempdir().expect("tempdir");
        let p = dir.path().join("c.jsonl");
        let line = serde_json::to_string(sample().as_slice().first().expect("block")).expect("ser");
        fs::write(&p, format!("{line}\n\n")).expect("write");
        let items: Vec<_> = stream_chain_jsonl(&p).expect("open").collect();
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err().to_string();
        assert!(err.contains("line 2"), "{err}");
    }

    #[test]
    fn unknown_extension_is_rejected_on_read() {
        assert!(read_chain_auto("chain.txt").is_err());
        assert!(read_chain_auto("chain").is_err());
    }
}
