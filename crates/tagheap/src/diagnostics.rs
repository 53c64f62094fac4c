//! Read-only view of an arena's block layout.
//!
//! [`Diagnostics`] borrows the arena immutably and exposes the raw tags
//! and the block list for verification. Nothing reachable from here can
//! write to storage.

use crate::directory::{Block, Blocks};
use crate::error::ArenaError;
use crate::storage::Storage;
use crate::tag::{Tag, TAG_SIZE};

/// Aggregate layout figures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Storage capacity in bytes.
    pub capacity: usize,
    /// Number of blocks, free and allocated.
    pub block_count: usize,
    /// Number of free blocks.
    pub free_block_count: usize,
    /// Bytes spanned by free blocks, tags included.
    pub free_bytes: usize,
    /// Bytes spanned by allocated blocks, tags included.
    pub allocated_bytes: usize,
    /// Payload bytes of the largest free block, 0 if none.
    pub largest_free_payload: usize,
}

/// Diagnostic view over an arena's storage.
pub struct Diagnostics<'a, const C: usize> {
    storage: &'a Storage<C>,
    verify: bool,
}

impl<'a, const C: usize> Diagnostics<'a, C> {
    pub(crate) fn new(storage: &'a Storage<C>, verify: bool) -> Self {
        Self { storage, verify }
    }

    /// Raw tag-sized integer at byte offset `index`.
    ///
    /// Reads any offset, not only block boundaries: inside an allocated
    /// payload this returns whatever the payload bytes encode.
    ///
    /// # Panics
    ///
    /// Panics if `index + TAG_SIZE > C`.
    pub fn tag_at(&self, index: usize) -> i32 {
        assert!(
            index + TAG_SIZE <= C,
            "tag index {index} out of range for capacity {C}"
        );
        self.storage.raw_at(index)
    }

    /// Blocks in address order.
    pub fn blocks(&self) -> Blocks<'a, C> {
        Blocks::new(self.storage, self.verify)
    }

    /// Encoded header tag of every block, in address order.
    pub fn layout(&self) -> Result<Vec<i32>, ArenaError> {
        self.blocks()
            .map(|block| block.map(|b| b.tag().encode()))
            .collect()
    }

    /// Aggregate figures for the current layout.
    pub fn stats(&self) -> Result<ArenaStats, ArenaError> {
        let mut stats = ArenaStats {
            capacity: C,
            ..ArenaStats::default()
        };
        for block in self.blocks() {
            let block = block?;
            stats.block_count += 1;
            if block.is_free() {
                stats.free_block_count += 1;
                stats.free_bytes += block.size();
                stats.largest_free_payload = stats.largest_free_payload.max(block.payload_size());
            } else {
                stats.allocated_bytes += block.size();
            }
        }
        Ok(stats)
    }

    /// Check every layout invariant.
    ///
    /// Blocks must tile storage exactly, each header must equal its
    /// footer, each block must hold at least one payload byte, and no
    /// two neighbours may both be free. Footers are compared here even
    /// when the arena was configured not to verify them during scans.
    pub fn validate(&self) -> Result<(), ArenaError> {
        let mut previous: Option<Block> = None;
        let mut end = 0;
        for block in Blocks::new(self.storage, true) {
            let block = block?;
            if let Some(prev) = previous {
                if prev.is_free() && block.is_free() {
                    let raw = block.tag().encode();
                    return Err(ArenaError::CorruptionDetected {
                        offset: block.offset(),
                        header: raw,
                        footer: raw,
                    });
                }
            }
            end = block.end();
            previous = Some(block);
        }
        // Blocks stops only at C or on an error.
        debug_assert_eq!(end, C);
        Ok(())
    }

    /// Whether storage has been written yet. Before the first mutating
    /// call, the view reports a single free block of size `C`.
    pub fn is_initialized(&self) -> bool {
        self.storage.is_initialized()
    }

    /// Decoded tag at byte offset `index`.
    pub fn decoded_tag_at(&self, index: usize) -> Tag {
        Tag::decode(self.tag_at(index))
    }
}
