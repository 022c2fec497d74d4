//! The mesh abstraction layer: a capability trait
//! over an opaque host mesh, a derived read-only view (`IMesh`), and the
//! spatial-index capability traits the view relies on for coordinate
//! snapping.

pub mod host;
pub mod imesh;
pub mod spatial;

pub use host::{EdgeId, FaceId, HostMesh, Side, SimpleHostMesh, VertId};
pub use imesh::IMesh;
pub use spatial::{Aabb, CoordinateIndex, LinearCoordinateIndex, LinearOverlap, LinearPlaneIndex, Overlap, PlaneIndex};
