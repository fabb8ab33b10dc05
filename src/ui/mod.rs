//! Terminal viewer built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! - **[`app`]**: application state and the keyboard event loop
//! - **[`panes`]**: stateless render functions for the heap, log and status bar
//! - **[`theme`]**: color palette shared by all panes
//!
//! Everything is laid out before the viewer starts; the UI only moves a
//! cursor over finished snapshots.

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
