//! Trace input
//!
//! - [`parse`]: line grammar, turning text into [`Event`]s
//! - [`call`]: function names, argument sanitation and typed calls

pub mod call;
pub mod parse;

pub use call::{parse_number, Arg, Call, Event, Function};
pub use parse::{parse_line, Events, Trace};
