//! The staged-addition half of a change buffer: growing
//! vert/edge/face sequences, each addressed by an extended index starting
//! right after the host mesh's own element count.

use std::collections::HashMap;

use crate::data::{Eps, ExtIndex, Position};
use crate::error::BooleanError;

#[derive(Debug, Clone)]
pub struct StagedVert {
    pub co: Position,
    pub example: Option<ExtIndex>,
}

#[derive(Debug, Clone)]
pub struct StagedEdge {
    pub v1: ExtIndex,
    pub v2: ExtIndex,
    pub example: Option<ExtIndex>,
}

#[derive(Debug, Clone)]
pub struct StagedFace {
    pub verts: Vec<ExtIndex>,
    pub edges: Vec<ExtIndex>,
    pub example: Option<ExtIndex>,
    pub other_examples: Vec<ExtIndex>,
}

/// Staged additions, addressed starting at `base_vert`/`base_edge`/
/// `base_face` (the host mesh's element counts at the start of the call).
#[derive(Debug, Clone)]
pub struct MeshAdd {
    base_vert: usize,
    base_edge: usize,
    base_face: usize,
    verts: Vec<StagedVert>,
    edges: Vec<StagedEdge>,
    faces: Vec<StagedFace>,
    edge_lookup: HashMap<(ExtIndex, ExtIndex), ExtIndex>,
    face_lookup: HashMap<Vec<ExtIndex>, ExtIndex>,
}

impl MeshAdd {
    pub fn new(base_vert: usize, base_edge: usize, base_face: usize) -> Self {
        MeshAdd {
            base_vert,
            base_edge,
            base_face,
            verts: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            edge_lookup: HashMap::new(),
            face_lookup: HashMap::new(),
        }
    }

    pub fn is_staged_vert(&self, ext: ExtIndex) -> bool {
        ext >= self.base_vert
    }

    pub fn is_staged_edge(&self, ext: ExtIndex) -> bool {
        ext >= self.base_edge
    }

    pub fn is_staged_face(&self, ext: ExtIndex) -> bool {
        ext >= self.base_face
    }

    pub fn verts(&self) -> &[StagedVert] {
        &self.verts
    }

    pub fn edges(&self) -> &[StagedEdge] {
        &self.edges
    }

    pub fn faces(&self) -> &[StagedFace] {
        &self.faces
    }

    pub fn base_vert(&self) -> usize {
        self.base_vert
    }

    pub fn base_edge(&self) -> usize {
        self.base_edge
    }

    pub fn base_face(&self) -> usize {
        self.base_face
    }

    pub fn vert(&self, ext: ExtIndex) -> &StagedVert {
        &self.verts[ext - self.base_vert]
    }

    pub fn edge(&self, ext: ExtIndex) -> &StagedEdge {
        &self.edges[ext - self.base_edge]
    }

    pub fn face(&self, ext: ExtIndex) -> &StagedFace {
        &self.faces[ext - self.base_face]
    }

    /// Stages a new vertex. When `checkdup` is set, first does a linear
    /// scan of already-staged vertices for one within `eps` of `co` in
    /// L-infinity norm (compared in single precision, matching the host's
    /// stored vertex precision), returning its extended index instead of
    /// staging a duplicate.
    pub fn add_vert(&mut self, co: Position, example: Option<ExtIndex>, checkdup: bool, eps: Eps) -> ExtIndex {
        if checkdup {
            if let Some(found) = self.find_staged_dup(co, eps) {
                return found;
            }
        }
        self.verts.push(StagedVert { co, example });
        self.base_vert + self.verts.len() - 1
    }

    fn find_staged_dup(&self, co: Position, eps: Eps) -> Option<ExtIndex> {
        let co32 = [co[0] as f32, co[1] as f32, co[2] as f32];
        let eps32 = eps as f32;
        self.verts.iter().enumerate().find_map(|(i, v)| {
            let vco = [v.co[0] as f32, v.co[1] as f32, v.co[2] as f32];
            let within = (0..3).all(|k| (vco[k] - co32[k]).abs() <= eps32);
            within.then_some(self.base_vert + i)
        })
    }

    /// Stages a new edge, deduped on the unordered endpoint pair.
    pub fn add_edge(&mut self, v1: ExtIndex, v2: ExtIndex, example: Option<ExtIndex>) -> ExtIndex {
        let key = if v1 < v2 { (v1, v2) } else { (v2, v1) };
        if let Some(&ext) = self.edge_lookup.get(&key) {
            return ext;
        }
        self.edges.push(StagedEdge { v1, v2, example });
        let ext = self.base_edge + self.edges.len() - 1;
        self.edge_lookup.insert(key, ext);
        ext
    }

    /// Stages a new face, deduped on the unordered vertex set. `verts` and
    /// `edges` must be the same, non-empty length and at least 3 long.
    ///
    /// Two independent retessellation calls over the same coplanar footprint
    /// (one per overlapping part) stage the same triangle twice with
    /// possibly different winding and example attribution; rather than
    /// letting both through, a second call with the same vertex set folds
    /// its `example`/`other_examples` into the face already staged and
    /// returns its extended index.
    pub fn add_face(
        &mut self,
        verts: Vec<ExtIndex>,
        edges: Vec<ExtIndex>,
        example: Option<ExtIndex>,
        other_examples: Vec<ExtIndex>,
    ) -> Result<ExtIndex, BooleanError> {
        if verts.len() < 3 || verts.len() != edges.len() {
            return Err(BooleanError::InvalidFaceLength { len: verts.len() });
        }
        let mut key = verts.clone();
        key.sort_unstable();
        if let Some(&ext) = self.face_lookup.get(&key) {
            let existing = &mut self.faces[ext - self.base_face];
            for candidate in example.into_iter().chain(other_examples) {
                if existing.example != Some(candidate) && !existing.other_examples.contains(&candidate) {
                    existing.other_examples.push(candidate);
                }
            }
            return Ok(ext);
        }
        self.faces.push(StagedFace {
            verts,
            edges,
            example,
            other_examples,
        });
        let ext = self.base_face + self.faces.len() - 1;
        self.face_lookup.insert(key, ext);
        Ok(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_vert_dedups_within_buffer() {
        let mut add = MeshAdd::new(4, 3, 1);
        let a = add.add_vert([0.0, 0.0, 0.0], None, true, 1e-6);
        let b = add.add_vert([0.0, 0.0, 0.0000001], None, true, 1e-6);
        assert_eq!(a, b);
        assert_eq!(add.verts().len(), 1);
    }

    #[test]
    fn add_vert_without_checkdup_always_appends() {
        let mut add = MeshAdd::new(0, 0, 0);
        let a = add.add_vert([0.0, 0.0, 0.0], None, false, 1e-6);
        let b = add.add_vert([0.0, 0.0, 0.0], None, false, 1e-6);
        assert_ne!(a, b);
    }

    #[test]
    fn add_edge_dedups_on_unordered_endpoints() {
        let mut add = MeshAdd::new(0, 0, 0);
        let e1 = add.add_edge(3, 7, None);
        let e2 = add.add_edge(7, 3, None);
        assert_eq!(e1, e2);
        assert_eq!(add.edges().len(), 1);
    }

    #[test]
    fn add_face_rejects_short_faces() {
        let mut add = MeshAdd::new(0, 0, 0);
        let err = add.add_face(vec![0, 1], vec![0, 1], None, vec![]).unwrap_err();
        assert!(matches!(err, BooleanError::InvalidFaceLength { len: 2 }));
    }

    #[test]
    fn add_face_dedups_on_vertex_set_and_merges_examples() {
        let mut add = MeshAdd::new(0, 0, 0);
        let f1 = add.add_face(vec![0, 1, 2], vec![0, 1, 2], Some(10), vec![]).unwrap();
        // Same triangle, opposite winding, different example: folds in.
        let f2 = add.add_face(vec![2, 1, 0], vec![2, 1, 0], Some(11), vec![]).unwrap();
        assert_eq!(f1, f2);
        assert_eq!(add.faces().len(), 1);
        let face = add.face(f1);
        assert_eq!(face.example, Some(10));
        assert_eq!(face.other_examples, vec![11]);
    }

    #[test]
    fn extended_indices_start_at_the_supplied_base() {
        let mut add = MeshAdd::new(10, 20, 30);
        let v = add.add_vert([1.0, 1.0, 1.0], None, false, 1e-6);
        assert_eq!(v, 10);
        let e = add.add_edge(10, 11, None);
        assert_eq!(e, 20);
        let f = add.add_face(vec![10, 11, 12], vec![20, 20, 20], None, vec![]).unwrap();
        assert_eq!(f, 30);
    }
}
