//! Output rendering
//!
//! Rendering is purely mechanical: everything positional has already been
//! decided by [`crate::layout`].

pub mod html;
