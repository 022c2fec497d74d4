//! The coplanar-parts intersection path: conservatively collect
//! every element of both parts. The real overlap is resolved later by the
//! planar retessellator, which dedups coincident geometry through CDT.

use crate::intersect::pair::PartPartIntersect;
use crate::parts::MeshPart;

pub fn intersect_coplanar(a: &MeshPart, b: &MeshPart, a_index: usize, b_index: usize) -> PartPartIntersect {
    let mut result = PartPartIntersect::new(a_index, b_index);
    for &v in a.verts.iter().chain(b.verts.iter()) {
        result.verts.insert(v);
    }
    for &e in a.edges.iter().chain(b.edges.iter()) {
        result.edges.insert(e);
    }
    for &f in a.faces.iter().chain(b.faces.iter()) {
        result.faces.insert(f);
    }
    result
}
