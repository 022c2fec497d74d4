//! Index containers used to thread extended indices (original mesh
//! indices and staged add-buffer indices, see `crate::data::ExtIndex`)
//! through the rest of the engine without pulling in a full arena crate.

pub mod indexed_set;
pub mod int_map;
pub mod int_set;

pub use indexed_set::IndexedIntSet;
pub use int_map::{resolve_merge, IntIntMap};
pub use int_set::IntSet;
