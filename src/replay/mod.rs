//! Trace replay
//!
//! [`engine::Replayer`] consumes normalized [`Event`](crate::trace::Event)s
//! one at a time and appends a [`Snapshot`](crate::snapshot::Snapshot) per
//! allocator call. Annotations don't produce a snapshot of their own; their
//! text rides on the next one.

pub mod engine;

pub use engine::{replay, Replayer, Step};
