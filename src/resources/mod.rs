//! Filesystem primitives: file placement and content comparison.
//!
//! Everything here works on absolute paths that have already been resolved
//! from the declaration; nothing in this layer knows about categories.
pub mod compare;
pub mod placement;

/// Helpers shared by placement and comparison.
pub mod helpers {
    pub mod fs;
}

pub use compare::{DiffStatus, FileDiff};
pub use placement::{Action, Mode, Placement};
