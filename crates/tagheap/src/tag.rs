//! Boundary tags.
//!
//! Every block carries the same [`Tag`] at its first and last
//! [`TAG_SIZE`] bytes. On disk (well, in [`Storage`](crate::storage)) a
//! tag is a native-endian `i32` whose magnitude is the total span of the
//! block, header and footer included, and whose sign is the block state:
//! positive for free, negative for allocated.

use std::fmt;

/// Width of one encoded tag in bytes.
pub const TAG_SIZE: usize = std::mem::size_of::<i32>();

/// Bytes of bookkeeping per block (header plus footer).
pub const TAG_OVERHEAD: usize = 2 * TAG_SIZE;

/// Smallest legal block: both tags and one payload byte.
pub const MIN_BLOCK: usize = TAG_OVERHEAD + 1;

/// Whether a block is available for allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockState {
    /// Available; encoded as a positive tag.
    Free,
    /// Handed out by `allocate`; encoded as a negative tag.
    Allocated,
}

/// Decoded form of a boundary tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    size: usize,
    state: BlockState,
}

impl Tag {
    /// A free block spanning `size` bytes.
    pub const fn free(size: usize) -> Self {
        Self {
            size,
            state: BlockState::Free,
        }
    }

    /// An allocated block spanning `size` bytes.
    pub const fn allocated(size: usize) -> Self {
        Self {
            size,
            state: BlockState::Allocated,
        }
    }

    /// Decode a raw tag. A zero tag decodes to a free block of size zero,
    /// which callers reject as corrupt.
    pub const fn decode(raw: i32) -> Self {
        let size = raw.unsigned_abs() as usize;
        if raw < 0 {
            Self::allocated(size)
        } else {
            Self::free(size)
        }
    }

    /// Encode into the signed on-storage representation.
    ///
    /// # Panics
    ///
    /// Panics if `size` does not fit in an `i32`. Arena capacities are
    /// checked against `i32::MAX` at compile time, so every block size
    /// the engine produces fits.
    pub fn encode(self) -> i32 {
        let magnitude = i32::try_from(self.size).expect("block size exceeds i32::MAX");
        match self.state {
            BlockState::Free => magnitude,
            BlockState::Allocated => -magnitude,
        }
    }

    /// Total bytes spanned by the block, tags included.
    pub const fn size(self) -> usize {
        self.size
    }

    /// Block state carried in the sign.
    pub const fn state(self) -> BlockState {
        self.state
    }

    /// Shorthand for `state() == BlockState::Free`.
    pub const fn is_free(self) -> bool {
        matches!(self.state, BlockState::Free)
    }

    /// Payload bytes available inside the block.
    pub const fn payload_size(self) -> usize {
        self.size.saturating_sub(TAG_OVERHEAD)
    }

    /// Same size, opposite state.
    pub(crate) const fn with_state(self, state: BlockState) -> Self {
        Self {
            size: self.size,
            state,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            BlockState::Free => write!(f, "free({})", self.size),
            BlockState::Allocated => write!(f, "allocated({})", self.size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_encodes_state() {
        assert_eq!(Tag::free(36).encode(), 36);
        assert_eq!(Tag::allocated(12).encode(), -12);
    }

    #[test]
    fn decode_inverts_encode() {
        assert_eq!(Tag::decode(-12), Tag::allocated(12));
        assert_eq!(Tag::decode(24), Tag::free(24));
    }

    #[test]
    fn zero_decodes_as_empty_free_block() {
        let tag = Tag::decode(0);
        assert!(tag.is_free());
        assert_eq!(tag.size(), 0);
        assert!(tag.size() < MIN_BLOCK);
    }

    #[test]
    fn payload_size_excludes_both_tags() {
        assert_eq!(Tag::allocated(12).payload_size(), 4);
        assert_eq!(Tag::free(MIN_BLOCK).payload_size(), 1);
    }

    #[test]
    fn with_state_keeps_size() {
        let tag = Tag::allocated(20).with_state(BlockState::Free);
        assert_eq!(tag, Tag::free(20));
    }

    #[test]
    fn display_names_state() {
        assert_eq!(Tag::free(8).to_string(), "free(8)");
        assert_eq!(Tag::allocated(8).to_string(), "allocated(8)");
    }
}
