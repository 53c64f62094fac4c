//! The arena: typed allocation over a fixed byte buffer.

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;
use std::ops::Range;

use tracing::{debug, warn};

use crate::alloc::{self, Fit};
use crate::coalesce;
use crate::config::ArenaConfig;
use crate::diagnostics::Diagnostics;
use crate::directory;
use crate::error::{ArenaError, FreeRejection};
use crate::handle::Payload;
use crate::raw;
use crate::storage::Storage;
use crate::tag::{MIN_BLOCK, TAG_OVERHEAD};

/// Fixed-capacity allocator for elements of type `T` over `C` bytes.
///
/// Storage lives inline in the arena; nothing is requested from the
/// system heap. Blocks are tracked with boundary tags, handed out
/// first-fit, and merged with free neighbours as soon as they are freed.
///
/// The arena does not run destructors for values still in storage when
/// it is dropped. Pair every [`construct`](Arena::construct) with a
/// [`destroy`](Arena::destroy) before freeing the block.
///
/// ```
/// use tagheap::Arena;
///
/// let mut arena = Arena::<i32, 36>::new();
/// let p = arena.allocate(1)?;
/// arena.construct(p, 0, 42);
/// assert_eq!(unsafe { arena.read(p, 0) }, 42);
/// unsafe { arena.destroy(p, 0) };
/// arena.deallocate(p)?;
/// assert_eq!(arena.diagnostics().layout()?, vec![36]);
/// # Ok::<(), tagheap::ArenaError>(())
/// ```
pub struct Arena<T, const C: usize> {
    storage: Storage<C>,
    config: ArenaConfig,
    _marker: PhantomData<T>,
}

impl<T, const C: usize> Arena<T, C> {
    /// Create an arena with the default configuration.
    pub const fn new() -> Self {
        Self::with_config(ArenaConfig::new())
    }

    /// Create an arena with the given configuration.
    ///
    /// Storage is not written until the first allocation.
    pub const fn with_config(config: ArenaConfig) -> Self {
        const {
            assert!(size_of::<T>() > 0, "zero-sized element types are not supported");
            assert!(
                C >= TAG_OVERHEAD + size_of::<T>(),
                "capacity cannot hold one element and its tags"
            );
            assert!(C <= i32::MAX as usize, "capacity does not fit in a tag");
        }
        Self {
            storage: Storage::new(),
            config,
            _marker: PhantomData,
        }
    }

    /// Storage capacity in bytes.
    pub const fn capacity(&self) -> usize {
        C
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocate room for `n` contiguous elements.
    ///
    /// Picks the lowest-addressed free block that fits and splits off the
    /// unused tail when it is large enough to stand alone (see
    /// [`SplitPolicy`](crate::SplitPolicy)). The payload is not zeroed.
    ///
    /// # Errors
    ///
    /// [`ArenaError::EmptyRequest`] if `n == 0`;
    /// [`ArenaError::OutOfMemory`] if no free block fits.
    pub fn allocate(&mut self, n: usize) -> Result<Payload<T>, ArenaError> {
        if n == 0 {
            return Err(ArenaError::EmptyRequest);
        }
        self.storage.ensure_init();

        let need = n.saturating_mul(size_of::<T>());
        let span = need.saturating_add(TAG_OVERHEAD);
        match alloc::first_fit(&self.storage, span, self.config.verify_tags)? {
            Fit::Found(block) => {
                let min_remainder = self.config.split.min_remainder(size_of::<T>());
                let carved = alloc::carve(&mut self.storage, block, span, min_remainder);
                debug!(
                    offset = carved.offset(),
                    size = carved.size(),
                    elements = n,
                    "allocated"
                );
                Ok(Payload::new(carved.payload_offset(), n))
            }
            Fit::Exhausted { largest_free } => {
                warn!(requested = need, largest_free, "out of memory");
                Err(ArenaError::OutOfMemory {
                    requested: need,
                    largest_free,
                })
            }
        }
    }

    /// Free an allocation and merge it with free neighbours.
    ///
    /// # Errors
    ///
    /// [`ArenaError::InvalidFree`] if `payload` does not name a live
    /// allocation of at least its length (foreign handle, double free);
    /// [`ArenaError::CorruptionDetected`] if the block or a neighbour has
    /// inconsistent tags. Either way nothing is written.
    pub fn deallocate(&mut self, payload: Payload<T>) -> Result<(), ArenaError> {
        let offset = payload.offset();
        let reject = |reason: FreeRejection| -> Result<(), ArenaError> {
            warn!(offset, %reason, "rejected free");
            Err(ArenaError::InvalidFree { offset, reason })
        };

        let header = match payload.header_offset() {
            Some(header) if header <= C - MIN_BLOCK => header,
            _ => return reject(FreeRejection::OutOfBounds),
        };
        self.storage.ensure_init();

        let verify = self.config.verify_tags;
        let Some(block) = directory::find_block(&self.storage, header, verify)? else {
            return reject(FreeRejection::NotABlock);
        };
        if block.is_free() {
            return reject(FreeRejection::AlreadyFree);
        }
        if payload.byte_len().is_none_or(|bytes| bytes > block.payload_size()) {
            return reject(FreeRejection::LengthMismatch);
        }

        let merged = coalesce::release(&mut self.storage, block, verify)?;
        debug!(
            offset = block.offset(),
            size = block.size(),
            merged_offset = merged.offset(),
            merged_size = merged.size(),
            "deallocated"
        );
        Ok(())
    }

    /// Move `value` into element `index` of `payload`.
    ///
    /// Block tags are never touched. Any value already at that element is
    /// overwritten without being dropped.
    ///
    /// # Panics
    ///
    /// Panics if `index >= payload.len()`, or if `payload` no longer names
    /// a live allocation of at least its length (stale or foreign handle).
    pub fn construct(&mut self, payload: Payload<T>, index: usize, value: T) {
        let range = element_range(payload, index);
        assert!(
            self.is_live(payload),
            "payload at offset {} is not a live allocation",
            payload.offset()
        );
        raw::place(&mut self.storage.bytes_mut()[range], value);
    }

    /// Whether `payload` starts an allocated block large enough for it.
    fn is_live(&self, payload: Payload<T>) -> bool {
        let Some(header) = payload.header_offset().filter(|&h| h <= C - MIN_BLOCK) else {
            return false;
        };
        match directory::find_block(&self.storage, header, self.config.verify_tags) {
            Ok(Some(block)) => {
                !block.is_free()
                    && payload
                        .byte_len()
                        .is_some_and(|bytes| bytes <= block.payload_size())
            }
            _ => false,
        }
    }

    /// Drop the value at element `index` of `payload`.
    ///
    /// # Safety
    ///
    /// A value must have been placed there with [`construct`](Self::construct)
    /// and not yet destroyed or taken.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`construct`](Self::construct).
    #[allow(unsafe_code)]
    pub unsafe fn destroy(&mut self, payload: Payload<T>, index: usize) {
        // SAFETY: forwarded from the caller.
        drop(unsafe { self.take(payload, index) });
    }

    /// Move the value at element `index` of `payload` out of the arena.
    ///
    /// # Safety
    ///
    /// Same contract as [`destroy`](Self::destroy).
    #[allow(unsafe_code)]
    pub unsafe fn take(&mut self, payload: Payload<T>, index: usize) -> T {
        let range = element_range(payload, index);
        // SAFETY: the caller guarantees a live `T` sits at this element.
        unsafe { raw::take(&self.storage.bytes()[range]) }
    }

    /// Copy out the value at element `index` of `payload`.
    ///
    /// # Safety
    ///
    /// The element must hold a value placed with
    /// [`construct`](Self::construct).
    #[allow(unsafe_code)]
    pub unsafe fn read(&self, payload: Payload<T>, index: usize) -> T
    where
        T: Copy,
    {
        let range = element_range(payload, index);
        // SAFETY: the caller guarantees a valid `T` sits at this element;
        // `T: Copy` so reading does not move it out.
        unsafe { raw::take(&self.storage.bytes()[range]) }
    }

    /// Raw address of the first element of `payload`.
    ///
    /// The pointer is only aligned for the tag type and is invalidated
    /// when the arena moves. Access through it must use
    /// `read_unaligned` / `write_unaligned`.
    ///
    /// # Panics
    ///
    /// Panics if the payload offset lies outside storage.
    pub fn as_mut_ptr(&mut self, payload: Payload<T>) -> *mut T {
        self.storage.bytes_mut()[payload.offset()..].as_mut_ptr().cast()
    }

    /// Read-only diagnostic view of the block layout.
    pub fn diagnostics(&self) -> Diagnostics<'_, C> {
        Diagnostics::new(&self.storage, self.config.verify_tags)
    }

    /// Check every layout invariant. See [`Diagnostics::validate`].
    pub fn validate(&self) -> Result<(), ArenaError> {
        self.diagnostics().validate()
    }
}

fn element_range<T>(payload: Payload<T>, index: usize) -> Range<usize> {
    assert!(
        index < payload.len(),
        "element index {index} out of range for payload of {} elements",
        payload.len()
    );
    let start = payload.offset() + index * size_of::<T>();
    start..start + size_of::<T>()
}

impl<T, const C: usize> Default for Arena<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const C: usize> fmt::Debug for Arena<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &C)
            .field("initialized", &self.storage.is_initialized())
            .field("config", &self.config)
            .finish()
    }
}
