//! Error types shared across the crate
//!
//! Per-event anomalies in a trace (failed allocations, dangling pointers,
//! crashed calls) are not errors here: they are folded into the affected
//! snapshot's log. What remains are the conditions that stop a stage outright.

use thiserror::Error;

/// A trace line that names a known function but cannot be decoded.
///
/// The event source reports these and skips the line; replay never sees them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("line {line}: missing closing parenthesis or return value")]
    Malformed { line: usize },

    #[error("line {line}: {function} expects {expected} argument(s), got {got}")]
    Arity {
        line: usize,
        function: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: argument `{token}` of {function} is not a number")]
    NotANumber {
        line: usize,
        function: &'static str,
        token: String,
    },

    #[error("line {line}: return value `{token}` of {function} is not a number")]
    BadReturn {
        line: usize,
        function: &'static str,
        token: String,
    },
}

/// Structural impossibilities found while packing a snapshot into rows.
///
/// Any of these means the boundary grid does not describe the timeline it
/// was built from, so the run is aborted rather than drawing a wrong picture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("snapshot {snapshot}: block at {start:#x} was started but never finished")]
    Unterminated { snapshot: usize, start: u64 },

    #[error("snapshot {snapshot}: row {row} placed no blocks, {remaining} left unplaced")]
    NoProgress {
        snapshot: usize,
        row: usize,
        remaining: usize,
    },
}

impl LayoutError {
    /// Index of the snapshot whose layout failed.
    pub fn snapshot(&self) -> usize {
        match self {
            LayoutError::Unterminated { snapshot, .. } => *snapshot,
            LayoutError::NoProgress { snapshot, .. } => *snapshot,
        }
    }
}

/// Invalid option combinations rejected before any replay happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("chunk rounding must be at least 1")]
    ZeroRound,

    #[error("invalid number `{0}`")]
    BadNumber(String),
}
