//! Element fixtures whose lifecycle can be observed from outside.

use std::cell::Cell;
use std::rc::Rc;

/// Shared count of [`Tracked`] values dropped so far.
#[derive(Clone, Debug, Default)]
pub struct DropLog {
    drops: Rc<Cell<usize>>,
}

impl DropLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a value that bumps this log when dropped.
    pub fn track(&self, id: u32) -> Tracked {
        Tracked {
            id,
            drops: Rc::clone(&self.drops),
        }
    }

    /// Number of tracked values dropped so far.
    pub fn drops(&self) -> usize {
        self.drops.get()
    }
}

/// A value that records its own drop in a [`DropLog`].
#[derive(Debug)]
pub struct Tracked {
    pub id: u32,
    drops: Rc<Cell<usize>>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// A 12-byte element, so one allocation of it spans 20 bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Triple(pub u32, pub u32, pub u32);
