//! # Introduction
//!
//! heapline replays a textual trace of allocator calls (`malloc`, `calloc`,
//! `realloc`, `free` and friends) and draws the heap after every call as a
//! row of colored blocks. All snapshots share one coordinate grid, so the
//! same address lines up vertically across the whole history; that makes
//! overlaps, reuse and dangling frees easy to spot by eye.
//!
//! ## Pipeline
//!
//! ```text
//! Trace text → Events → Replayer → Timeline → Boundary grid → Rows → HTML / TUI
//! ```
//!
//! 1. [`trace`]: parses trace lines into normalized [`trace::Event`]s.
//! 2. [`replay`]: the allocator state machine; appends one
//!    [`snapshot::Snapshot`] per call and records anomalies on it.
//! 3. [`memory`]: chunk model and the header/footer/rounding
//!    [`memory::Geometry`].
//! 4. [`layout`]: packs each snapshot into rows against the global grid.
//! 5. [`render`]: HTML document writer.
//! 6. [`ui`]: ratatui viewer; not part of the stable library API.
//!
//! Replay never fails: broken traces show up as error lines on the affected
//! snapshot. Layout fails only when the grid cannot explain a chunk, which
//! is reported as [`error::LayoutError`].

pub mod config;
pub mod error;
pub mod layout;
pub mod memory;
pub mod render;
pub mod replay;
pub mod snapshot;
pub mod trace;
pub mod ui;
