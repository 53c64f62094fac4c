//! Test utilities for tagheap development.
//!
//! Provides an independent layout checker that reads nothing but raw
//! tags through [`Diagnostics::tag_at`], layout assertion helpers, and
//! drop-observing fixtures (see [`fixtures`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use tagheap::{Diagnostics, TAG_SIZE};

/// The six orders in which three allocations can be freed.
pub const FREE_ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Walk the raw tags and check the layout invariants without using the
/// library's own block iterator.
///
/// Returns the encoded header of every block on success, or a
/// description of the first violation.
pub fn check_layout<const C: usize>(diag: &Diagnostics<'_, C>) -> Result<Vec<i32>, String> {
    let mut layout = Vec::new();
    let mut offset = 0usize;
    let mut previous_free = false;
    while offset < C {
        if offset + TAG_SIZE > C {
            return Err(format!("header at {offset} runs past capacity {C}"));
        }
        let header = diag.tag_at(offset);
        let size = header.unsigned_abs() as usize;
        if size < 2 * TAG_SIZE + 1 {
            return Err(format!("block at {offset} has size {size}, below minimum"));
        }
        if offset + size > C {
            return Err(format!("block at {offset} of size {size} overruns capacity {C}"));
        }
        let footer = diag.tag_at(offset + size - TAG_SIZE);
        if footer != header {
            return Err(format!("block at {offset}: header {header} != footer {footer}"));
        }
        let free = header > 0;
        if free && previous_free {
            return Err(format!("adjacent free blocks ending at {offset}"));
        }
        previous_free = free;
        layout.push(header);
        offset += size;
    }
    Ok(layout)
}

/// Assert the layout is valid and return it.
///
/// # Panics
///
/// Panics with the violation message if any invariant is broken.
pub fn assert_valid<const C: usize>(diag: &Diagnostics<'_, C>) -> Vec<i32> {
    match check_layout(diag) {
        Ok(layout) => layout,
        Err(msg) => panic!("invalid arena layout: {msg}"),
    }
}

/// Assert the layout is valid and equals `expected`.
pub fn assert_layout<const C: usize>(diag: &Diagnostics<'_, C>, expected: &[i32]) {
    let layout = assert_valid(diag);
    assert_eq!(layout, expected, "unexpected block layout");
}

/// Sum of block magnitudes in a layout.
pub fn spanned(layout: &[i32]) -> usize {
    layout.iter().map(|t| t.unsigned_abs() as usize).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagheap::Arena;

    #[test]
    fn fresh_arena_checks_out() {
        let arena = Arena::<i32, 36>::new();
        assert_layout(&arena.diagnostics(), &[36]);
    }

    #[test]
    fn checker_agrees_with_library_layout() {
        let mut arena = Arena::<i32, 64>::new();
        let _a = arena.allocate(1).unwrap();
        let b = arena.allocate(3).unwrap();
        let _c = arena.allocate(2).unwrap();
        arena.deallocate(b).unwrap();
        let diag = arena.diagnostics();
        assert_eq!(assert_valid(&diag), diag.layout().unwrap());
    }

    #[test]
    fn free_orders_are_distinct_permutations() {
        for (i, a) in FREE_ORDERS.iter().enumerate() {
            let mut sorted = *a;
            sorted.sort_unstable();
            assert_eq!(sorted, [0, 1, 2]);
            for b in &FREE_ORDERS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn spanned_sums_magnitudes() {
        assert_eq!(spanned(&[-12, 12, -12]), 36);
    }
}
