//! Ordered chain view.
//!
//! Storage is an external concern; verification only needs positional access.
//! [`Chain`] is that narrow interface, and [`BlockChain`] is the in-memory,
//! insertion-ordered implementation used by the CLI and tests.

use serde::{Deserialize, Serialize};

use crate::types::{Block, BlockHash};

/// Positional, read-only view of an ordered block sequence.
pub trait Chain {
    /// Number of blocks.
    fn len(&self) -> usize;

    /// Block at `index`; callers guarantee `index < self.len()`.
    fn block_at(&self, index: usize) -> &Block;

    /// Whether the chain has no blocks.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Chain for [Block] {
    fn len(&self) -> usize {
        <[Block]>::len(self)
    }

    fn block_at(&self, index: usize) -> &Block {
        &self[index]
    }
}

impl Chain for Vec<Block> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn block_at(&self, index: usize) -> &Block {
        &self[index]
    }
}

impl<C: Chain + ?Sized> Chain for &C {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn block_at(&self, index: usize) -> &Block {
        (**self).block_at(index)
    }
}

/// Insertion-ordered chain that owns its blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockChain {
    blocks: Vec<Block>,
}

impl BlockChain {
    /// Empty chain.
    #[must_use]
    pub const fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Append a block (no validation; that is the verifier's job).
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Hash of the last block, or [`BlockHash::ZERO`] when empty.
    #[must_use]
    pub fn tip_hash(&self) -> BlockHash {
        self.blocks.last().map_or(BlockHash::ZERO, |b| b.hash)
    }

    /// Iterate blocks in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Borrow the blocks as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable access for callers that build or repair chains.
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Consume into the owned block vector.
    #[must_use]
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl Chain for BlockChain {
    fn len(&self) -> usize {
        self.blocks.len()
    }

    fn block_at(&self, index: usize) -> &Block {
        &self.blocks[index]
    }
}

impl From<Vec<Block>> for BlockChain {
    fn from(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}

impl FromIterator<Block> for BlockChain {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BlockChain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
