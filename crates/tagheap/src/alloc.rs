//! Allocation engine: first-fit search and split-or-consume.

use tracing::trace;

use crate::directory::{Block, Blocks};
use crate::error::ArenaError;
use crate::storage::Storage;
use crate::tag::Tag;

/// Outcome of a first-fit scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fit {
    /// The lowest-addressed free block spanning at least the request.
    Found(Block),
    /// Nothing fits. Carries the payload size of the largest free block.
    Exhausted { largest_free: usize },
}

/// Scan from offset 0 for the first free block of at least `span` bytes.
pub(crate) fn first_fit<const C: usize>(
    storage: &Storage<C>,
    span: usize,
    verify: bool,
) -> Result<Fit, ArenaError> {
    let mut largest_free = 0;
    for block in Blocks::new(storage, verify) {
        let block = block?;
        if !block.is_free() {
            continue;
        }
        if block.size() >= span {
            return Ok(Fit::Found(block));
        }
        largest_free = largest_free.max(block.payload_size());
    }
    Ok(Fit::Exhausted { largest_free })
}

/// Turn the front of the free `block` into an allocated block of `span`
/// bytes.
///
/// The leftover becomes a new free block when it is at least
/// `min_remainder` bytes; otherwise the whole block is handed out.
/// Returns the allocated block.
pub(crate) fn carve<const C: usize>(
    storage: &mut Storage<C>,
    block: Block,
    span: usize,
    min_remainder: usize,
) -> Block {
    debug_assert!(block.is_free() && block.size() >= span);
    let remainder = block.size() - span;
    if remainder < min_remainder {
        let whole = Tag::allocated(block.size());
        storage.write_block(block.offset(), whole);
        trace!(offset = block.offset(), size = block.size(), "consumed whole block");
        return Block::new(block.offset(), whole);
    }

    let head = Tag::allocated(span);
    storage.write_block(block.offset(), head);
    storage.write_block(block.offset() + span, Tag::free(remainder));
    trace!(
        offset = block.offset(),
        size = span,
        remainder,
        "split block"
    );
    Block::new(block.offset(), head)
}
