//! The part-pair intersector: coplanar parts are merged
//! conservatively; non-coplanar parts are clipped along their shared line.

pub mod coplanar;
pub mod noncoplanar;
pub mod pair;

pub use coplanar::intersect_coplanar;
pub use noncoplanar::intersect_noncoplanar;
pub use pair::PartPartIntersect;
