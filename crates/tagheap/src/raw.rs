//! Low-level primitives for placing typed values in arena bytes.
//!
//! Payloads sit 4 bytes past a block header, so they are only aligned
//! for the tag type. Every access here is unaligned. This is the only
//! module with `unsafe` blocks; each carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::mem::size_of;
use std::ptr;

/// Move `value` into `slot`.
///
/// Whatever bytes were in `slot` are overwritten without being dropped.
///
/// # Panics
///
/// Panics if `slot` is not exactly `size_of::<T>()` bytes.
pub(crate) fn place<T>(slot: &mut [u8], value: T) {
    assert_eq!(slot.len(), size_of::<T>(), "slot does not fit one element");
    // SAFETY: `slot` is a live, exclusively borrowed region of exactly
    // `size_of::<T>()` bytes and `write_unaligned` has no alignment
    // requirement.
    unsafe { ptr::write_unaligned(slot.as_mut_ptr().cast::<T>(), value) }
}

/// Move a value out of `slot`.
///
/// # Panics
///
/// Panics if `slot` is not exactly `size_of::<T>()` bytes.
///
/// # Safety
///
/// `slot` must hold a valid `T` previously written by [`place`] that
/// has not been moved out since, unless `T: Copy`.
pub(crate) unsafe fn take<T>(slot: &[u8]) -> T {
    assert_eq!(slot.len(), size_of::<T>(), "slot does not fit one element");
    // SAFETY: the length check keeps the read in bounds, `read_unaligned`
    // has no alignment requirement, and the caller guarantees the bytes
    // form a valid `T`.
    unsafe { ptr::read_unaligned(slot.as_ptr().cast::<T>()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_then_take_at_odd_offset() {
        let mut bytes = [0u8; 16];
        place(&mut bytes[3..11], 0x1122_3344_5566_7788u64);
        let v: u64 = unsafe { take(&bytes[3..11]) };
        assert_eq!(v, 0x1122_3344_5566_7788);
    }

    #[test]
    fn take_moves_owned_values() {
        let mut bytes = [0u8; 64];
        let n = size_of::<String>();
        place(&mut bytes[4..4 + n], String::from("tag"));
        let s: String = unsafe { take(&bytes[4..4 + n]) };
        assert_eq!(s, "tag");
    }

    #[test]
    #[should_panic(expected = "slot does not fit one element")]
    fn place_rejects_short_slot() {
        let mut bytes = [0u8; 2];
        place(&mut bytes[..], 7u32);
    }
}
