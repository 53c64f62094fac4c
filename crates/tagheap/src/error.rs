//! Arena error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// Every error is raised before the arena is mutated, so a failed call
/// leaves the block layout exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// No free block is large enough for the request.
    OutOfMemory {
        /// Payload bytes requested (saturated on overflow).
        requested: usize,
        /// Payload bytes of the largest free block at the time of the call.
        largest_free: usize,
    },
    /// `deallocate` was handed a payload that is not a live allocation.
    InvalidFree {
        /// Payload offset carried by the rejected handle.
        offset: usize,
        /// Why the handle was rejected.
        reason: FreeRejection,
    },
    /// A block's boundary tags are inconsistent.
    ///
    /// This signals a bookkeeping error from an earlier out-of-bounds
    /// write; the arena cannot be trusted after it is reported.
    CorruptionDetected {
        /// Byte offset of the block header.
        offset: usize,
        /// Raw header tag.
        header: i32,
        /// Raw footer tag, or the header again when the header alone
        /// was enough to prove corruption.
        footer: i32,
    },
    /// `allocate(0)` was requested.
    EmptyRequest,
}

/// Reason attached to [`ArenaError::InvalidFree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FreeRejection {
    /// The offset falls outside the arena's storage.
    OutOfBounds,
    /// The offset is inside storage but no block's payload starts there.
    NotABlock,
    /// The block is already free (double free).
    AlreadyFree,
    /// The handle's element count needs more bytes than the block holds.
    LengthMismatch,
}

impl fmt::Display for FreeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "offset out of bounds"),
            Self::NotABlock => write!(f, "not the start of a block payload"),
            Self::AlreadyFree => write!(f, "block already free"),
            Self::LengthMismatch => write!(f, "length does not match the allocation"),
        }
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                largest_free,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes, largest free block holds {largest_free} bytes"
                )
            }
            Self::InvalidFree { offset, reason } => {
                write!(f, "invalid free at offset {offset}: {reason}")
            }
            Self::CorruptionDetected {
                offset,
                header,
                footer,
            } => {
                write!(
                    f,
                    "corrupt block at offset {offset}: header {header}, footer {footer}"
                )
            }
            Self::EmptyRequest => write!(f, "cannot allocate zero elements"),
        }
    }
}

impl Error for ArenaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_out_of_memory() {
        let err = ArenaError::OutOfMemory {
            requested: 4,
            largest_free: 0,
        };
        assert_eq!(
            err.to_string(),
            "out of memory: requested 4 bytes, largest free block holds 0 bytes"
        );
    }

    #[test]
    fn display_invalid_free_includes_reason() {
        let err = ArenaError::InvalidFree {
            offset: 16,
            reason: FreeRejection::AlreadyFree,
        };
        assert_eq!(err.to_string(), "invalid free at offset 16: block already free");
    }

    #[test]
    fn display_corruption() {
        let err = ArenaError::CorruptionDetected {
            offset: 0,
            header: -12,
            footer: 7,
        };
        assert!(err.to_string().contains("header -12, footer 7"));
    }
}
