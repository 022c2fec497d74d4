//! The result record of intersecting two parts.

use crate::index::IntSet;

#[derive(Debug, Clone)]
pub struct PartPartIntersect {
    pub a_index: usize,
    pub b_index: usize,
    pub verts: IntSet,
    pub edges: IntSet,
    pub faces: IntSet,
}

impl PartPartIntersect {
    pub fn new(a_index: usize, b_index: usize) -> Self {
        PartPartIntersect {
            a_index,
            b_index,
            verts: IntSet::new(),
            edges: IntSet::new(),
            faces: IntSet::new(),
        }
    }
}
