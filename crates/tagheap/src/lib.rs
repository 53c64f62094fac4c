//! Fixed-capacity boundary-tag allocator.
//!
//! An [`Arena<T, C>`](Arena) owns a `C`-byte buffer inline and hands out
//! room for `T` elements from it, without touching the system heap after
//! construction.
//!
//! # Architecture
//!
//! ```text
//! Arena<T, C> (typed facade)
//! ├── Storage<C>      [u8; C], lazily laid out as one free block
//! ├── directory       implicit block list read from boundary tags
//! ├── alloc           first-fit scan + split-or-consume
//! ├── coalesce        free + right/left merge with free neighbours
//! ├── raw             unaligned placement of T values (only unsafe code)
//! └── Diagnostics     read-only tag/block view for verification
//! ```
//!
//! # Block layout
//!
//! Every block begins and ends with the same 4-byte tag. Its magnitude
//! is the block's total size, tags included; its sign is the state
//! (positive free, negative allocated):
//!
//! ```text
//! | +36 |           free payload (28)            | +36 |
//!
//! after allocate(1) for i32:
//! | -12 | i32 | -12 | +24 |  free payload (16)   | +24 |
//! ```
//!
//! Blocks always tile the buffer exactly and no two free blocks are ever
//! adjacent: every free merges with free neighbours immediately.
//!
//! # Alignment
//!
//! Payloads are aligned only for the tag type. Typed access goes through
//! [`Arena::construct`], [`Arena::destroy`], [`Arena::take`] and
//! [`Arena::read`], which never assume more.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod alloc;
pub mod arena;
mod coalesce;
pub mod config;
pub mod diagnostics;
pub mod directory;
pub mod error;
pub mod handle;
mod raw;
mod storage;
pub mod tag;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use config::{ArenaConfig, SplitPolicy};
pub use diagnostics::{ArenaStats, Diagnostics};
pub use directory::{Block, Blocks};
pub use error::{ArenaError, FreeRejection};
pub use handle::Payload;
pub use tag::{BlockState, Tag, TAG_SIZE};
