//! A single erase block's GC-relevant state.
//!
//! Blocks live in a flat, array-indexed table per die (no per-block heap
//! allocation); `prev`/`next` are indices into that same table, not
//! pointers, so a block's position in its candidate bucket is just two
//! integers living alongside its counters.

use static_assertions::const_assert;

pub type BlockNo = u32;

/// Sentinel meaning "no block" for both list links and victim results.
pub const BLOCK_NONE: BlockNo = BlockNo::MAX;

const_assert!(BLOCK_NONE == u32::MAX);

#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub invalid_slice_count: u32,
    pub erase_count: u32,
    pub prev: BlockNo,
    pub next: BlockNo,
}

impl Block {
    pub const fn new() -> Self {
        Self {
            invalid_slice_count: 0,
            erase_count: 0,
            prev: BLOCK_NONE,
            next: BLOCK_NONE,
        }
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}
