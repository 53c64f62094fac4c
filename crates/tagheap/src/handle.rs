//! Payload handles.
//!
//! A [`Payload`] names an allocation by its payload offset inside the
//! arena, not by address, so an arena can be moved while allocations are
//! live. It also remembers the element count it was allocated for, which
//! `deallocate` checks against the block.

use std::fmt;
use std::marker::PhantomData;

use crate::tag::TAG_SIZE;

/// Location of an allocation within an [`Arena`](crate::Arena).
///
/// Handles are plain values: copying one does not duplicate the
/// allocation. Freeing through a stale copy is rejected by `deallocate`,
/// and constructing through one panics, rather than corrupting the arena.
#[must_use]
pub struct Payload<T> {
    /// Byte offset of the first payload byte.
    offset: usize,
    /// Number of `T` elements requested.
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Payload<T> {
    pub(crate) const fn new(offset: usize, len: usize) -> Self {
        Self {
            offset,
            len,
            _marker: PhantomData,
        }
    }

    /// Byte offset of the payload within arena storage.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Number of elements the allocation was requested for.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the handle covers zero elements. Never true for handles
    /// returned by `allocate`.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Payload size in bytes (`len * size_of::<T>()`), or `None` on
    /// overflow.
    pub const fn byte_len(&self) -> Option<usize> {
        self.len.checked_mul(std::mem::size_of::<T>())
    }

    /// Byte offset of the block header, or `None` if the offset is too
    /// small to have one.
    pub const fn header_offset(&self) -> Option<usize> {
        self.offset.checked_sub(TAG_SIZE)
    }
}

impl<T> Clone for Payload<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Payload<T> {}

impl<T> PartialEq for Payload<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.len == other.len
    }
}

impl<T> Eq for Payload<T> {}

impl<T> fmt::Debug for Payload<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

impl<T> fmt::Display for Payload<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload(off={}, len={})", self.offset, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let p = Payload::<u32>::new(16, 3);
        assert_eq!(p.offset(), 16);
        assert_eq!(p.len(), 3);
        assert!(!p.is_empty());
        assert_eq!(p.byte_len(), Some(12));
        assert_eq!(p.header_offset(), Some(12));
    }

    #[test]
    fn header_offset_underflow() {
        assert_eq!(Payload::<u8>::new(2, 1).header_offset(), None);
    }

    #[test]
    fn byte_len_overflow() {
        assert_eq!(Payload::<u64>::new(4, usize::MAX).byte_len(), None);
    }

    #[test]
    fn copies_compare_equal() {
        let p = Payload::<String>::new(4, 1);
        let q = p;
        assert_eq!(p, q);
        assert_eq!(p.to_string(), "Payload(off=4, len=1)");
    }
}
