//! TUI pane rendering
//!
//! - [`heap`]: the current snapshot's rows drawn on the shared grid
//! - [`log`]: info and error lines attached to the snapshot
//! - [`status`]: position, play state and keybindings

pub mod heap;
pub mod log;
pub mod status;

pub use heap::{render_heap_pane, HeapRenderData, HeapScrollState};
pub use log::render_log_pane;
pub use status::render_status_bar;
