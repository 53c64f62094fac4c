//! Arena configuration parameters.

/// When a free block is split instead of handed out whole.
///
/// After carving `2 * TAG_SIZE + need` bytes off a free block, the
/// leftover either becomes a new free block or is absorbed into the
/// allocation. The policy decides how small a leftover may be.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Split only when the leftover can hold a free block with room for
    /// one element: `remainder >= 2 * TAG_SIZE + size_of::<T>()`.
    ///
    /// Guarantees that no free block is too small to ever satisfy an
    /// `allocate(1)`.
    #[default]
    ElementFit,
    /// Split whenever the leftover exceeds the two tags:
    /// `remainder > 2 * TAG_SIZE`. Leaves splinters that may hold fewer
    /// bytes than one element.
    TagPair,
}

impl SplitPolicy {
    /// Smallest leftover (in bytes, tags included) that becomes its own
    /// free block for elements of `elem_size` bytes.
    pub const fn min_remainder(self, elem_size: usize) -> usize {
        match self {
            Self::ElementFit => crate::tag::TAG_OVERHEAD + elem_size,
            Self::TagPair => crate::tag::MIN_BLOCK,
        }
    }
}

/// Configuration for an [`Arena`](crate::Arena).
///
/// Capacity and element type are compile-time parameters of the arena;
/// this struct only carries the runtime policies. All values are
/// immutable once the arena is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Leftover policy applied by the allocation engine.
    ///
    /// Default: [`SplitPolicy::ElementFit`].
    pub split: SplitPolicy,

    /// Compare every block's footer against its header while scanning.
    ///
    /// Default: `true`. Bounds and minimum-size checks run regardless,
    /// since scans depend on them to stay inside storage.
    pub verify_tags: bool,
}

impl ArenaConfig {
    /// Default: verify footers on every scan.
    pub const DEFAULT_VERIFY_TAGS: bool = true;

    /// Create a config with default values.
    pub const fn new() -> Self {
        Self {
            split: SplitPolicy::ElementFit,
            verify_tags: Self::DEFAULT_VERIFY_TAGS,
        }
    }

    /// Replace the split policy.
    pub const fn with_split(mut self, split: SplitPolicy) -> Self {
        self.split = split;
        self
    }

    /// Enable or disable footer verification.
    pub const fn with_verify_tags(mut self, verify_tags: bool) -> Self {
        self.verify_tags = verify_tags;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ArenaConfig::default();
        assert_eq!(config.split, SplitPolicy::ElementFit);
        assert!(config.verify_tags);
    }

    #[test]
    fn builder_overrides() {
        let config = ArenaConfig::new()
            .with_split(SplitPolicy::TagPair)
            .with_verify_tags(false);
        assert_eq!(config.split, SplitPolicy::TagPair);
        assert!(!config.verify_tags);
    }

    #[test]
    fn element_fit_is_stricter_than_tag_pair() {
        assert_eq!(SplitPolicy::TagPair.min_remainder(4), 9);
        assert_eq!(SplitPolicy::ElementFit.min_remainder(4), 12);
        assert_eq!(SplitPolicy::ElementFit.min_remainder(1), 9);
    }
}
