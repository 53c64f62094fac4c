//! Block directory: the implicit list formed by the boundary tags.
//!
//! No pointers are kept. The block after one at `offset` starts at
//! `offset + size`; the block before it ends at `offset` and its footer
//! gives its size. [`Blocks`] walks the list front to back.

use tracing::error;

use crate::error::ArenaError;
use crate::storage::Storage;
use crate::tag::{BlockState, Tag, MIN_BLOCK, TAG_SIZE};

/// A block as seen through its header tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    offset: usize,
    tag: Tag,
}

impl Block {
    pub(crate) const fn new(offset: usize, tag: Tag) -> Self {
        Self { offset, tag }
    }

    /// Byte offset of the header.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Total bytes spanned, tags included.
    pub const fn size(&self) -> usize {
        self.tag.size()
    }

    /// Free or allocated.
    pub const fn state(&self) -> BlockState {
        self.tag.state()
    }

    /// Shorthand for `state() == BlockState::Free`.
    pub const fn is_free(&self) -> bool {
        self.tag.is_free()
    }

    /// The decoded header tag.
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// Byte offset of the first payload byte.
    pub const fn payload_offset(&self) -> usize {
        self.offset + TAG_SIZE
    }

    /// Payload bytes between the two tags.
    pub const fn payload_size(&self) -> usize {
        self.tag.payload_size()
    }

    /// Byte offset of the footer.
    pub const fn footer_offset(&self) -> usize {
        self.offset + self.tag.size() - TAG_SIZE
    }

    /// One past the last byte of the block; the next block's offset.
    pub const fn end(&self) -> usize {
        self.offset + self.tag.size()
    }
}

fn corrupt(offset: usize, header: i32, footer: i32) -> ArenaError {
    error!(offset, header, footer, "boundary tag corruption");
    ArenaError::CorruptionDetected {
        offset,
        header,
        footer,
    }
}

/// Read the block whose header sits at `offset`.
///
/// The header must describe a block of at least [`MIN_BLOCK`] bytes that
/// ends inside storage. With `verify` set, the footer must also match.
pub(crate) fn read_block<const C: usize>(
    storage: &Storage<C>,
    offset: usize,
    verify: bool,
) -> Result<Block, ArenaError> {
    let header = storage.raw_at(offset);
    let tag = Tag::decode(header);
    if tag.size() < MIN_BLOCK || tag.size() > C - offset {
        return Err(corrupt(offset, header, header));
    }
    let block = Block::new(offset, tag);
    if verify {
        let footer = storage.raw_at(block.footer_offset());
        if footer != header {
            return Err(corrupt(offset, header, footer));
        }
    }
    Ok(block)
}

/// Read the block whose footer ends exactly at `end`, i.e. the left
/// neighbour of a block starting at `end`.
pub(crate) fn read_block_before<const C: usize>(
    storage: &Storage<C>,
    end: usize,
    verify: bool,
) -> Result<Block, ArenaError> {
    let footer_offset = end - TAG_SIZE;
    let footer = storage.raw_at(footer_offset);
    let tag = Tag::decode(footer);
    if tag.size() < MIN_BLOCK || tag.size() > end {
        return Err(corrupt(footer_offset, footer, footer));
    }
    let block = Block::new(end - tag.size(), tag);
    if verify {
        let header = storage.raw_at(block.offset());
        if header != footer {
            return Err(corrupt(block.offset(), header, footer));
        }
    }
    Ok(block)
}

/// Find the block whose header is at exactly `offset`, walking from the
/// front. Returns `Ok(None)` if `offset` falls inside a block or past
/// the end.
pub(crate) fn find_block<const C: usize>(
    storage: &Storage<C>,
    offset: usize,
    verify: bool,
) -> Result<Option<Block>, ArenaError> {
    for block in Blocks::new(storage, verify) {
        let block = block?;
        if block.offset() == offset {
            return Ok(Some(block));
        }
        if block.offset() > offset {
            break;
        }
    }
    Ok(None)
}

/// Front-to-back iterator over the blocks in storage.
///
/// Yields `Err` once, on the first malformed block, and then stops.
pub struct Blocks<'a, const C: usize> {
    storage: &'a Storage<C>,
    cursor: usize,
    verify: bool,
    failed: bool,
}

impl<'a, const C: usize> Blocks<'a, C> {
    pub(crate) fn new(storage: &'a Storage<C>, verify: bool) -> Self {
        Self {
            storage,
            cursor: 0,
            verify,
            failed: false,
        }
    }
}

impl<const C: usize> Iterator for Blocks<'_, C> {
    type Item = Result<Block, ArenaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= C {
            return None;
        }
        match read_block(self.storage, self.cursor, self.verify) {
            Ok(block) => {
                self.cursor = block.end();
                Some(Ok(block))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
