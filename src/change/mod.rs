//! The staged change buffer: additive `MeshAdd` and
//! `MeshDelete` records combined into a `MeshChange`, plus the applier that
//! commits one atomically to a host mesh.

pub mod add;
pub mod apply;
pub mod change;
pub mod delete;

pub use add::{MeshAdd, StagedEdge, StagedFace, StagedVert};
pub use apply::apply;
pub use change::MeshChange;
pub use delete::MeshDelete;
