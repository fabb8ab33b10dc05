//! Seeded color assignment for chunks
//!
//! Colors carry no meaning; they only let the eye follow one allocation
//! across snapshots. A fixed seed keeps the output reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used when none is given on the command line.
pub const DEFAULT_SEED: u64 = 226;

/// Display color of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Neutral grey used for error markers.
    pub const MARKER: Rgb = Rgb(0xc0, 0xc0, 0xc0);

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Pastel generator: each channel is a random byte averaged with a base tint
pub struct Palette {
    rng: StdRng,
}

impl Palette {
    const BASE: (u16, u16, u16) = (200, 200, 125);

    pub fn new(seed: u64) -> Self {
        Palette {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_color(&mut self) -> Rgb {
        let (r, g, b) = Self::BASE;
        Rgb(self.channel(r), self.channel(g), self.channel(b))
    }

    fn channel(&mut self, base: u16) -> u8 {
        // (0..=255 + 0..=255) / 2 always fits a byte
        ((self.rng.gen_range(0..256u16) + base) / 2) as u8
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
