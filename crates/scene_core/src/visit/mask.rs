//! Traversal masks

use bitflags::bitflags;

bitflags! {
    /// Bit set selecting which children a traversal enters
    ///
    /// A child tagged with `mask` is entered when
    /// `traversal_mask & (override_mask | mask)` is non-empty.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mask: u64 {
        /// Every bit set
        const ALL = u64::MAX;
    }
}

impl Mask {
    /// Mask with the single bit `index` set
    ///
    /// # Panics
    ///
    /// If `index` is 64 or more.
    pub const fn bit(index: u32) -> Self {
        assert!(index < u64::BITS, "mask bit index out of range");
        Self::from_bits_retain(1 << index)
    }

    /// Whether a child tagged with `child` passes this traversal mask
    pub fn admits(self, override_mask: Self, child: Self) -> bool {
        self.intersects(override_mask | child)
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_selection() {
        let traversal = Mask::bit(0) | Mask::bit(2);
        assert!(traversal.admits(Mask::empty(), Mask::bit(2)));
        assert!(!traversal.admits(Mask::empty(), Mask::bit(1)));
        assert!(!traversal.admits(Mask::empty(), Mask::empty()));
        assert!(traversal.admits(Mask::bit(0), Mask::empty()));
        assert!(Mask::ALL.admits(Mask::empty(), Mask::bit(63)));
    }

    #[test]
    #[should_panic(expected = "mask bit index out of range")]
    fn test_bit_index_past_width() {
        let index = std::hint::black_box(64);
        let _ = Mask::bit(index);
    }
}
