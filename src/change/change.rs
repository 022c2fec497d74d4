//! The staged delta committed by `change::apply`.

use crate::change::add::MeshAdd;
use crate::change::delete::MeshDelete;
use crate::index::{IntIntMap, IntSet};

#[derive(Debug, Clone)]
pub struct MeshChange {
    pub add: MeshAdd,
    pub delete: MeshDelete,
    pub merge_map: IntIntMap,
    pub intersection_edges: IntSet,
    pub flip_faces: IntSet,
    pub kill_loose: bool,
}

impl MeshChange {
    pub fn new(totvert: usize, totedge: usize, totface: usize, kill_loose: bool) -> Self {
        MeshChange {
            add: MeshAdd::new(totvert, totedge, totface),
            delete: MeshDelete::new(totvert, totedge, totface),
            merge_map: IntIntMap::new(),
            intersection_edges: IntSet::new(),
            flip_faces: IntSet::new(),
            kill_loose,
        }
    }
}
