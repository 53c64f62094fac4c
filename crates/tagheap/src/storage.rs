//! Fixed-size backing buffer and tag primitives.
//!
//! [`Storage`] is the byte array every block lives in. It starts
//! logically uninitialised: the first mutating call lays down a single
//! free block spanning the whole buffer. Until then, reads report that
//! layout without writing it, so shared views of a fresh arena agree
//! with what the first allocation will see.

use tracing::trace;

use crate::tag::{Tag, TAG_SIZE};

/// Byte buffer of capacity `C`, exclusively owned by one arena.
pub(crate) struct Storage<const C: usize> {
    bytes: [u8; C],
    /// Whether the initial free block has been written.
    initialized: bool,
}

impl<const C: usize> Storage<C> {
    /// Create uninitialised storage. No tags are written yet.
    pub(crate) const fn new() -> Self {
        Self {
            bytes: [0; C],
            initialized: false,
        }
    }

    /// Lay down the initial free block if this is the first touch.
    pub(crate) fn ensure_init(&mut self) {
        if self.initialized {
            return;
        }
        self.write_block(0, Tag::free(C));
        self.initialized = true;
        trace!(capacity = C, "storage initialised as one free block");
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Raw tag stored at byte offset `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + TAG_SIZE > C`.
    pub(crate) fn raw_at(&self, offset: usize) -> i32 {
        if !self.initialized && (offset == 0 || offset + TAG_SIZE == C) {
            // Capacity is bounded by i32::MAX at compile time.
            return C as i32;
        }
        let mut buf = [0u8; TAG_SIZE];
        buf.copy_from_slice(&self.bytes[offset..offset + TAG_SIZE]);
        i32::from_ne_bytes(buf)
    }

    /// Write a single tag at `offset`.
    pub(crate) fn write_tag(&mut self, offset: usize, tag: Tag) {
        self.bytes[offset..offset + TAG_SIZE].copy_from_slice(&tag.encode().to_ne_bytes());
    }

    /// Write matching header and footer for a block starting at `offset`.
    pub(crate) fn write_block(&mut self, offset: usize, tag: Tag) {
        self.write_tag(offset, tag);
        self.write_tag(offset + tag.size() - TAG_SIZE, tag);
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}
