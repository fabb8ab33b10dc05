//! Chunk geometry: how a requested size maps onto an occupied address range
//!
//! Allocators put bookkeeping around user data and hand out chunks in fixed
//! granules. [`Geometry`] captures that as four numbers and is passed
//! explicitly wherever a chunk is built, so two scenarios with different
//! policies never share hidden state.

/// Per-chunk overhead and rounding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Metadata bytes in front of the user pointer
    pub header: u64,
    /// Metadata bytes after the user data
    pub footer: u64,
    /// Chunk size granularity, always >= 1
    pub round: u64,
    /// Smallest chunk the allocator hands out
    pub minsz: u64,
}

impl Geometry {
    /// No overhead, no rounding: a chunk is exactly the requested bytes.
    pub const RAW: Geometry = Geometry {
        header: 0,
        footer: 0,
        round: 1,
        minsz: 0,
    };

    pub fn new(header: u64, footer: u64, round: u64, minsz: u64) -> Self {
        Geometry {
            header,
            footer,
            round,
            minsz,
        }
    }

    /// Full chunk size for a request of `user_size` bytes.
    pub fn chunk_size(&self, user_size: u64) -> u64 {
        let needed = user_size
            .saturating_add(self.header)
            .saturating_add(self.footer);
        round_up(needed.max(self.minsz), self.round)
    }

    /// `[start, end)` of the chunk whose user pointer is `address`.
    ///
    /// Both ends saturate at the edges of the address space, so a chunk that
    /// would wrap is drawn shorter than it is. [`Geometry::fits`] tells the
    /// two cases apart.
    pub fn span(&self, address: u64, user_size: u64) -> (u64, u64) {
        let start = address.saturating_sub(self.header);
        (start, start.saturating_add(self.chunk_size(user_size)))
    }

    /// Whether the chunk at `address` ends inside the address space.
    pub fn fits(&self, address: u64, user_size: u64) -> bool {
        let size = user_size
            .checked_add(self.header)
            .and_then(|n| n.checked_add(self.footer))
            .map(|n| n.max(self.minsz))
            .and_then(|n| n.checked_next_multiple_of(self.round));
        let start = address.saturating_sub(self.header);
        size.and_then(|size| start.checked_add(size)).is_some()
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            header: 8,
            footer: 0,
            round: 0x10,
            minsz: 0x20,
        }
    }
}

/// Round `size` up to the next multiple of `round`.
///
/// Callers guarantee `round >= 1`; a zero granule is rejected at configuration time.
pub fn round_up(size: u64, round: u64) -> u64 {
    let bumped = size.saturating_add(round - 1);
    bumped - bumped % round
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0, 0x10), 0);
        assert_eq!(round_up(1, 0x10), 0x10);
        assert_eq!(round_up(0x10, 0x10), 0x10);
        assert_eq!(round_up(0x11, 0x10), 0x20);
        assert_eq!(round_up(7, 1), 7);
    }

    #[test]
    fn test_default_span() {
        let g = Geometry::default();
        // 0x18 + 8 = 0x20, already aligned
        assert_eq!(g.span(0xa000, 0x18), (0x9ff8, 0xa018));
        // tiny requests are floored to minsz
        assert_eq!(g.span(0x2000, 0x1), (0x1ff8, 0x2018));
        assert_eq!(g.span(0x2000, 0x19), (0x1ff8, 0x2028));
    }

    #[test]
    fn test_raw_span_is_literal() {
        let g = Geometry::RAW;
        assert_eq!(g.span(0x1000, 0x13), (0x1000, 0x1013));
        assert_eq!(g.span(0x1000, 0), (0x1000, 0x1000));
    }

    #[test]
    fn test_footer_counts_toward_size() {
        let g = Geometry::new(8, 8, 0x10, 0x20);
        assert_eq!(g.chunk_size(0x20), 0x30);
    }

    #[test]
    fn test_top_of_address_space_is_capped() {
        let g = Geometry::default();
        let addr = 0xffff_ffff_ffff_ffef;
        assert!(!g.fits(addr, 0x100));
        assert_eq!(g.span(addr, 0x100), (0xffff_ffff_ffff_ffe7, u64::MAX));

        assert!(g.fits(0xffff_ffff_ffff_0008, 0x100));
        assert!(!Geometry::RAW.fits(1, u64::MAX));
        assert!(Geometry::RAW.fits(0, u64::MAX));
    }

    #[test]
    fn test_low_address_does_not_underflow() {
        let g = Geometry::default();
        assert_eq!(g.span(4, 0x10), (0, 0x20));
    }
}
