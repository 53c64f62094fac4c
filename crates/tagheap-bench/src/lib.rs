//! Benchmark profiles for the tagheap allocator.
//!
//! - [`request_sizes`]: deterministic element counts from a seed
//! - [`fragment`]: fill an arena, then free every other allocation

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tagheap::{Arena, Payload};

/// Generate `n` deterministic request sizes in `1..=max`.
///
/// Uses a 64-bit LCG step per draw so runs are reproducible by seed.
pub fn request_sizes(n: usize, max: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as usize % max) + 1
        })
        .collect()
}

/// Fill `arena` with allocations of seeded sizes until one fails, then
/// free every other allocation, leaving alternating holes.
///
/// Returns the handles that are still live.
pub fn fragment<const C: usize>(arena: &mut Arena<u32, C>, seed: u64) -> Vec<Payload<u32>> {
    let mut handles = Vec::new();
    for n in request_sizes(C, 8, seed) {
        match arena.allocate(n) {
            Ok(p) => handles.push(p),
            Err(_) => break,
        }
    }
    let mut live = Vec::with_capacity(handles.len() / 2 + 1);
    for (i, p) in handles.into_iter().enumerate() {
        if i % 2 == 0 {
            live.push(p);
        } else if arena.deallocate(p).is_err() {
            break;
        }
    }
    live
}
