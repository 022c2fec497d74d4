//! A single coplanar part: a supporting plane, an AABB, and
//! the three index lists of the original elements that live on it.

use crate::data::ExtIndex;
use crate::geom::Plane;
use crate::mesh::Aabb;

#[derive(Debug, Clone)]
pub struct MeshPart {
    pub plane: Plane,
    pub aabb: Option<Aabb>,
    pub verts: Vec<ExtIndex>,
    pub edges: Vec<ExtIndex>,
    pub faces: Vec<ExtIndex>,
}

impl MeshPart {
    pub fn new(plane: Plane) -> Self {
        MeshPart {
            plane,
            aabb: None,
            verts: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }
}
