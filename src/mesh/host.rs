//! The host-mesh capability trait: the
//! half-edge `BMesh` is explicitly out of scope, so the engine never owns a
//! concrete mesh type. `HostMesh` names the raw accessor/mutator surface any
//! indexed mesh representation can implement; [`crate::mesh::IMesh`] layers
//! the derived read-only operations (face planes, interior points,
//! tessellation, coordinate snapping) on top of it generically.
//!
//! `SimpleHostMesh` is the reference implementation: a plain indexed
//! vertex/face soup, good enough to exercise and test the engine standalone.

use crate::data::{Normal, Position, SideFlags};

/// A vertex identity in a host mesh's own index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertId(pub usize);

/// An edge identity in a host mesh's own index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub usize);

/// A face identity in a host mesh's own index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub usize);

/// Which operand a face belongs to, per the caller-supplied side predicate
///. `use_self` overrides the predicate entirely and is handled by
/// [`crate::boolean`] before this type is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Ignored,
    A,
    B,
}

/// The raw capability surface the engine needs from a host mesh.
///
/// Read accessors (enumeration, adjacency, coordinates) are used throughout
/// part building, intersection and classification. The mutating methods are
/// only ever called from the change applier (`change::apply`), which is not
/// reentrant with respect to a single mesh.
pub trait HostMesh {
    fn totvert(&self) -> usize;
    fn totedge(&self) -> usize;
    fn totface(&self) -> usize;

    fn face_len(&self, f: FaceId) -> usize;
    fn face_vert(&self, f: FaceId, i: usize) -> VertId;
    fn face_edge(&self, f: FaceId, i: usize) -> EdgeId;
    fn face_normal(&self, f: FaceId) -> Normal;

    fn vert_co(&self, v: VertId) -> Position;
    fn edge_verts(&self, e: EdgeId) -> (VertId, VertId);

    /// Looks up the edge between `v1` and `v2`, irrespective of direction.
    fn find_edge(&self, v1: VertId, v2: VertId) -> Option<EdgeId>;

    /// Creates a new vertex, optionally copying attributes from `example`.
    fn create_vert(&mut self, co: Position, example: Option<VertId>) -> VertId;

    /// Creates a new edge, optionally copying attributes from `example`.
    fn create_edge(&mut self, v1: VertId, v2: VertId, example: Option<EdgeId>) -> EdgeId;

    /// Creates a new face from `verts`/`edges` (parallel, same length),
    /// optionally copying attributes from `example`.
    fn create_face(&mut self, verts: &[VertId], edges: &[EdgeId], example: Option<FaceId>) -> FaceId;

    fn flip_face_normal(&mut self, f: FaceId);

    /// Marks `e` as lying on the computed intersection curve.
    fn tag_intersection_edge(&mut self, e: EdgeId);

    fn kill_face(&mut self, f: FaceId, kill_loose: bool);
    fn kill_edge(&mut self, e: EdgeId, kill_loose: bool);
    fn kill_vert(&mut self, v: VertId);

    /// Compacts index space after a batch of kills.
    /// A no-op is a valid implementation if the host never reuses freed
    /// slots, but the reference implementation does compact.
    fn reindex(&mut self);

    /// Stashes the consolidated side-flag bitmap on the face object itself
    ///, so the tag survives
    /// `reindex` the same way any other face attribute would.
    fn set_face_side_flags(&mut self, f: FaceId, flags: SideFlags);
    fn face_side_flags(&self, f: FaceId) -> SideFlags;
}

/// A minimal, fully-working `HostMesh`: parallel vectors of vertex
/// positions, edge endpoint pairs, and faces (vert/edge index lists), with
/// tombstone-based deletion swept on `reindex`.
#[derive(Debug, Default, Clone)]
pub struct SimpleHostMesh {
    verts: Vec<Option<Position>>,
    edges: Vec<Option<(VertId, VertId)>>,
    edge_intersection_tag: Vec<bool>,
    faces: Vec<Option<SimpleFace>>,
}

#[derive(Debug, Clone)]
struct SimpleFace {
    verts: Vec<VertId>,
    edges: Vec<EdgeId>,
    side_flags: SideFlags,
}

impl SimpleHostMesh {
    pub fn new() -> Self {
        SimpleHostMesh::default()
    }

    /// Builds a mesh from a vertex position list and a list of faces, each
    /// given as a cyclic list of vertex indices. Missing edges are created
    /// implicitly, deduped on unordered endpoint pairs.
    pub fn from_verts_and_faces(positions: &[Position], faces: &[Vec<usize>]) -> Self {
        let mut mesh = SimpleHostMesh::new();
        for &p in positions {
            mesh.verts.push(Some(p));
        }
        let mut edge_lookup = std::collections::HashMap::new();
        for face in faces {
            let n = face.len();
            let mut fverts = Vec::with_capacity(n);
            let mut fedges = Vec::with_capacity(n);
            for &vi in face {
                fverts.push(VertId(vi));
            }
            for i in 0..n {
                let a = face[i];
                let b = face[(i + 1) % n];
                let key = if a < b { (a, b) } else { (b, a) };
                let eid = *edge_lookup.entry(key).or_insert_with(|| {
                    mesh.edges.push(Some((VertId(a), VertId(b))));
                    mesh.edge_intersection_tag.push(false);
                    EdgeId(mesh.edges.len() - 1)
                });
                fedges.push(eid);
            }
            mesh.faces.push(Some(SimpleFace {
                verts: fverts,
                edges: fedges,
                side_flags: SideFlags::NONE,
            }));
        }
        mesh
    }

    pub fn is_intersection_edge(&self, e: EdgeId) -> bool {
        self.edge_intersection_tag[e.0]
    }

    pub fn live_face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_ref().map(|_| FaceId(i)))
    }
}

impl HostMesh for SimpleHostMesh {
    fn totvert(&self) -> usize {
        self.verts.len()
    }

    fn totedge(&self) -> usize {
        self.edges.len()
    }

    fn totface(&self) -> usize {
        self.faces.len()
    }

    fn face_len(&self, f: FaceId) -> usize {
        self.faces[f.0].as_ref().expect("live face").verts.len()
    }

    fn face_vert(&self, f: FaceId, i: usize) -> VertId {
        self.faces[f.0].as_ref().expect("live face").verts[i]
    }

    fn face_edge(&self, f: FaceId, i: usize) -> EdgeId {
        self.faces[f.0].as_ref().expect("live face").edges[i]
    }

    fn face_normal(&self, f: FaceId) -> Normal {
        let face = self.faces[f.0].as_ref().expect("live face");
        let co = |v: VertId| nalgebra::Vector3::from(self.vert_co(v));
        let a = co(face.verts[0]);
        let b = co(face.verts[1]);
        let c = co(face.verts[2 % face.verts.len()]);
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        if len <= f64::EPSILON {
            [0.0, 0.0, 0.0]
        } else {
            let n = n / len;
            [n.x, n.y, n.z]
        }
    }

    fn vert_co(&self, v: VertId) -> Position {
        self.verts[v.0].expect("live vert")
    }

    fn edge_verts(&self, e: EdgeId) -> (VertId, VertId) {
        self.edges[e.0].expect("live edge")
    }

    fn find_edge(&self, v1: VertId, v2: VertId) -> Option<EdgeId> {
        self.edges.iter().enumerate().find_map(|(i, e)| match e {
            Some((a, b)) if (*a == v1 && *b == v2) || (*a == v2 && *b == v1) => Some(EdgeId(i)),
            _ => None,
        })
    }

    fn create_vert(&mut self, co: Position, _example: Option<VertId>) -> VertId {
        self.verts.push(Some(co));
        VertId(self.verts.len() - 1)
    }

    fn create_edge(&mut self, v1: VertId, v2: VertId, _example: Option<EdgeId>) -> EdgeId {
        self.edges.push(Some((v1, v2)));
        self.edge_intersection_tag.push(false);
        EdgeId(self.edges.len() - 1)
    }

    fn create_face(&mut self, verts: &[VertId], edges: &[EdgeId], _example: Option<FaceId>) -> FaceId {
        self.faces.push(Some(SimpleFace {
            verts: verts.to_vec(),
            edges: edges.to_vec(),
            side_flags: SideFlags::NONE,
        }));
        FaceId(self.faces.len() - 1)
    }

    fn flip_face_normal(&mut self, f: FaceId) {
        let face = self.faces[f.0].as_mut().expect("live face");
        face.verts.reverse();
        face.edges.reverse();
        // Keep edge[i] connecting verts[i]..verts[i+1] after reversal: a
        // cyclic list reversed has its edges reversed and shifted by one.
        let n = face.edges.len();
        if n > 1 {
            face.edges.rotate_left(n - 1);
        }
    }

    fn tag_intersection_edge(&mut self, e: EdgeId) {
        self.edge_intersection_tag[e.0] = true;
    }

    fn kill_face(&mut self, f: FaceId, _kill_loose: bool) {
        self.faces[f.0] = None;
    }

    fn kill_edge(&mut self, e: EdgeId, _kill_loose: bool) {
        self.edges[e.0] = None;
    }

    fn kill_vert(&mut self, v: VertId) {
        self.verts[v.0] = None;
    }

    fn reindex(&mut self) {
        let mut vert_map = vec![None; self.verts.len()];
        let mut new_verts = Vec::new();
        for (i, v) in self.verts.iter().enumerate() {
            if let Some(co) = v {
                vert_map[i] = Some(VertId(new_verts.len()));
                new_verts.push(Some(*co));
            }
        }

        let mut edge_map = vec![None; self.edges.len()];
        let mut new_edges = Vec::new();
        let mut new_tags = Vec::new();
        for (i, e) in self.edges.iter().enumerate() {
            if let Some((a, b)) = e {
                if let (Some(na), Some(nb)) = (vert_map[a.0], vert_map[b.0]) {
                    edge_map[i] = Some(EdgeId(new_edges.len()));
                    new_edges.push(Some((na, nb)));
                    new_tags.push(self.edge_intersection_tag[i]);
                }
            }
        }

        let mut new_faces = Vec::new();
        for f in self.faces.iter() {
            if let Some(face) = f {
                let verts: Option<Vec<VertId>> = face.verts.iter().map(|v| vert_map[v.0]).collect();
                let edges: Option<Vec<EdgeId>> = face.edges.iter().map(|e| edge_map[e.0]).collect();
                if let (Some(verts), Some(edges)) = (verts, edges) {
                    new_faces.push(Some(SimpleFace {
                        verts,
                        edges,
                        side_flags: face.side_flags,
                    }));
                }
            }
        }

        self.verts = new_verts;
        self.edges = new_edges;
        self.edge_intersection_tag = new_tags;
        self.faces = new_faces;
    }

    fn set_face_side_flags(&mut self, f: FaceId, flags: SideFlags) {
        self.faces[f.0].as_mut().expect("live face").side_flags = flags;
    }

    fn face_side_flags(&self, f: FaceId) -> SideFlags {
        self.faces[f.0].as_ref().expect("live face").side_flags
    }
}
