//! Heap model replayed from a trace
//!
//! - [`geometry`]: header/footer/rounding policy turning a request into an address range
//! - [`chunk`]: one allocation with its display color and error flags
//! - [`palette`]: seeded color generator
//!
//! All addresses are plain `u64` in a single linear address space.

pub mod chunk;
pub mod geometry;
pub mod palette;

pub use chunk::Chunk;
pub use geometry::Geometry;
pub use palette::{Palette, Rgb};
