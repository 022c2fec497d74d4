//! Fatal error taxonomy for the boolean engine.
//!
//! Degenerate geometry and "open case" conditions are recovered locally
//! and never reach this type; only invariant violations and
//! allocation-style failures do, and both abort the call.

use thiserror::Error;

use crate::data::ExtIndex;

#[derive(Debug, Error)]
pub enum BooleanError {
    #[error("vertex merge map contains a cycle starting at extended index {start}")]
    MergeCycle { start: ExtIndex },

    #[error("face has fewer than 3 (vertex, edge) pairs: len={len}")]
    InvalidFaceLength { len: usize },

    #[error("expected an extended-index map entry for {index} but found none")]
    MissingMapEntry { index: ExtIndex },

    #[error("allocation failed: {0}")]
    Allocation(String),
}
