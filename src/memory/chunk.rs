//! One tracked heap allocation
//!
//! A [`Chunk`] remembers the user pointer and requested size exactly as the
//! trace reported them, and caches the metadata-inclusive `[start, end)`
//! range computed by the [`Geometry`] in force when it was built.

use super::geometry::Geometry;
use super::palette::Rgb;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Pointer returned to the program
    pub address: u64,
    /// Bytes the program asked for
    pub user_size: u64,
    pub color: Rgb,
    /// Set when the chunk is implicated in an inconsistency
    pub error: bool,
    /// Placeholder that lives for a single snapshot
    pub temporary: bool,
    start: u64,
    end: u64,
}

impl Chunk {
    pub fn new(geometry: &Geometry, address: u64, user_size: u64, color: Rgb) -> Self {
        let (start, end) = geometry.span(address, user_size);
        Chunk {
            address,
            user_size,
            color,
            error: false,
            temporary: false,
            start,
            end,
        }
    }

    /// Zero-size placeholder that makes a dangling pointer visible.
    pub fn marker(geometry: &Geometry, address: u64) -> Self {
        Chunk {
            error: true,
            temporary: true,
            ..Chunk::new(geometry, address, 0, Rgb::MARKER)
        }
    }

    /// Same allocation, now suspect.
    pub fn flagged(&self) -> Self {
        Chunk {
            error: true,
            ..self.clone()
        }
    }

    /// The allocation after a successful resize: new place, same color.
    pub fn resized(&self, geometry: &Geometry, address: u64, user_size: u64) -> Self {
        Chunk::new(geometry, address, user_size, self.color)
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    /// Only possible when the geometry has no floor and no overhead.
    pub fn is_zero_width(&self) -> bool {
        self.start == self.end
    }
}
