//! Coalescing engine: free a block and merge it with free neighbours.
//!
//! Neighbours are read and checked before anything is written, so a
//! corrupt neighbour aborts the free with the arena untouched.

use tracing::trace;

use crate::directory::{read_block, read_block_before, Block};
use crate::error::ArenaError;
use crate::storage::Storage;
use crate::tag::{BlockState, Tag};

/// Mark the allocated `block` free and merge it with free neighbours.
///
/// Merges right first, then left, so the left merge sees the footer the
/// right merge wrote. Returns the resulting free block.
pub(crate) fn release<const C: usize>(
    storage: &mut Storage<C>,
    block: Block,
    verify: bool,
) -> Result<Block, ArenaError> {
    debug_assert!(!block.is_free());
    let right = if block.end() < C {
        Some(read_block(storage, block.end(), verify)?)
    } else {
        None
    };
    let left = if block.offset() > 0 {
        Some(read_block_before(storage, block.offset(), verify)?)
    } else {
        None
    };

    let mut current = Block::new(block.offset(), block.tag().with_state(BlockState::Free));
    storage.write_block(current.offset(), current.tag());

    if let Some(right) = right.filter(Block::is_free) {
        let merged = Tag::free(current.size() + right.size());
        storage.write_tag(current.offset(), merged);
        storage.write_tag(right.footer_offset(), merged);
        trace!(offset = current.offset(), size = merged.size(), "merged right");
        current = Block::new(current.offset(), merged);
    }

    if let Some(left) = left.filter(Block::is_free) {
        let merged = Tag::free(left.size() + current.size());
        storage.write_tag(left.offset(), merged);
        storage.write_tag(current.footer_offset(), merged);
        trace!(offset = left.offset(), size = merged.size(), "merged left");
        current = Block::new(left.offset(), merged);
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Blocks;

    fn storage_with(layout: &[Tag]) -> Storage<36> {
        let mut storage = Storage::<36>::new();
        storage.ensure_init();
        let mut offset = 0;
        for &tag in layout {
            storage.write_block(offset, tag);
            offset += tag.size();
        }
        storage
    }

    fn layout(storage: &Storage<36>) -> Vec<i32> {
        Blocks::new(storage, true)
            .map(|b| b.unwrap().tag().encode())
            .collect()
    }

    fn allocated_at(offset: usize) -> Block {
        Block::new(offset, Tag::allocated(12))
    }

    #[test]
    fn isolated_block_just_flips_sign() {
        let mut storage = storage_with(&[Tag::allocated(12); 3]);
        let freed = release(&mut storage, allocated_at(12), true).unwrap();
        assert_eq!(freed, Block::new(12, Tag::free(12)));
        assert_eq!(layout(&storage), vec![-12, 12, -12]);
    }

    #[test]
    fn merges_right() {
        let mut storage = storage_with(&[Tag::allocated(12), Tag::allocated(12), Tag::free(12)]);
        let freed = release(&mut storage, allocated_at(12), true).unwrap();
        assert_eq!(freed, Block::new(12, Tag::free(24)));
        assert_eq!(layout(&storage), vec![-12, 24]);
    }

    #[test]
    fn merges_left() {
        let mut storage = storage_with(&[Tag::free(12), Tag::allocated(12), Tag::allocated(12)]);
        let freed = release(&mut storage, allocated_at(12), true).unwrap();
        assert_eq!(freed, Block::new(0, Tag::free(24)));
        assert_eq!(layout(&storage), vec![24, -12]);
    }

    #[test]
    fn merges_both_sides() {
        let mut storage = storage_with(&[Tag::free(12), Tag::allocated(12), Tag::free(12)]);
        let freed = release(&mut storage, allocated_at(12), true).unwrap();
        assert_eq!(freed, Block::new(0, Tag::free(36)));
        assert_eq!(layout(&storage), vec![36]);
        assert_eq!(storage.raw_at(32), 36);
    }

    #[test]
    fn edges_have_no_outer_neighbour() {
        let mut storage = storage_with(&[Tag::allocated(12), Tag::allocated(24)]);
        release(&mut storage, allocated_at(0), true).unwrap();
        assert_eq!(layout(&storage), vec![12, -24]);
        let last = Block::new(12, Tag::allocated(24));
        release(&mut storage, last, true).unwrap();
        assert_eq!(layout(&storage), vec![36]);
    }

    #[test]
    fn corrupt_neighbour_aborts_without_writing() {
        let mut storage = storage_with(&[Tag::allocated(12), Tag::allocated(12), Tag::free(12)]);
        // Break the right neighbour's footer.
        storage.write_tag(32, Tag::free(9));
        let before = storage.bytes().to_vec();
        let err = release(&mut storage, allocated_at(12), true).unwrap_err();
        assert!(matches!(err, ArenaError::CorruptionDetected { offset: 24, .. }));
        assert_eq!(storage.bytes(), &before[..]);
    }
}
