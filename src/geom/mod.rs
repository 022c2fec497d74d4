//! Robust-enough floating point geometry: planes, plane/line primitives, and
//! the generalized winding number. These live directly in the crate, small
//! and exact enough that wrapping them behind a capability trait like the
//! CDT primitive or the spatial indices would only add indirection.

pub mod plane;
pub mod primitives;
pub mod winding;

pub use plane::Plane;
pub use primitives::{plane_plane_intersect, segment_line_closest, segment_plane_intersect, Line};
pub use winding::{accumulate_face_contribution, finalize_gwn, is_inside, solid_angle};
