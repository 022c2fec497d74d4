//! Read-only derived view over a [`HostMesh`]. Everything here
//! is computed generically from the host's raw accessors plus a
//! [`CoordinateIndex`] built once over the host's original vertex
//! positions, so any `HostMesh` implementation gets `face_plane`,
//! `find_co_eps`, `face_point_interior` and `face_tessellation` for free.

use nalgebra::Vector3;

use crate::data::Position;
use crate::geom::Plane;
use crate::mesh::host::{EdgeId, FaceId, HostMesh, VertId};
use crate::mesh::spatial::CoordinateIndex;

pub struct IMesh<'m, H: HostMesh, C: CoordinateIndex> {
    host: &'m H,
    coord_index: C,
}

impl<'m, H: HostMesh, C: CoordinateIndex> IMesh<'m, H, C> {
    /// Builds the coordinate index once, over every original vertex. This
    /// index is *not* refreshed as new vertices are staged during the call
    /// (see `DESIGN.md` on `find_co_eps` staleness).
    pub fn new(host: &'m H) -> Self {
        let points: Vec<(usize, Position)> = (0..host.totvert())
            .map(|i| (i, host.vert_co(VertId(i))))
            .collect();
        IMesh {
            host,
            coord_index: C::build(&points),
        }
    }

    pub fn host(&self) -> &'m H {
        self.host
    }

    pub fn totvert(&self) -> usize {
        self.host.totvert()
    }

    pub fn totedge(&self) -> usize {
        self.host.totedge()
    }

    pub fn totface(&self) -> usize {
        self.host.totface()
    }

    pub fn face_len(&self, f: FaceId) -> usize {
        self.host.face_len(f)
    }

    pub fn face_vert(&self, f: FaceId, i: usize) -> VertId {
        self.host.face_vert(f, i % self.host.face_len(f))
    }

    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        Vector3::from(self.host.face_normal(f))
    }

    pub fn vert_co(&self, v: VertId) -> Vector3<f64> {
        Vector3::from(self.host.vert_co(v))
    }

    pub fn edge_verts(&self, e: EdgeId) -> (VertId, VertId) {
        self.host.edge_verts(e)
    }

    pub fn edge_cos(&self, e: EdgeId) -> (Vector3<f64>, Vector3<f64>) {
        let (a, b) = self.edge_verts(e);
        (self.vert_co(a), self.vert_co(b))
    }

    pub fn find_edge(&self, v1: VertId, v2: VertId) -> Option<EdgeId> {
        self.host.find_edge(v1, v2)
    }

    /// The supporting plane of a face: unit normal plus offset through its
    /// first vertex.
    pub fn face_plane(&self, f: FaceId) -> Plane {
        let normal = self.face_normal(f);
        let point = self.face_vert(f, 0);
        Plane::from_point_normal(self.vert_co(point), normal)
            .expect("face normal is degenerate: zero-area face should have been filtered upstream")
    }

    /// The minimum-index original vertex within `eps` (L-infinity) of `co`.
    pub fn find_co_eps(&self, co: Position, eps: f64) -> Option<VertId> {
        self.coord_index.find_within(co, eps).map(VertId)
    }

    /// A point strictly interior to a convex face: its vertex centroid.
    pub fn face_point_interior(&self, f: FaceId) -> Vector3<f64> {
        let n = self.face_len(f);
        let mut sum = Vector3::zeros();
        for i in 0..n {
            sum += self.vert_co(self.face_vert(f, i));
        }
        sum / n as f64
    }

    /// Fan-triangulates a face from its first vertex into `face_len - 2`
    /// triangles whose winding matches the face normal. Valid
    /// for convex faces, which is all this engine ever stages.
    pub fn face_tessellation(&self, f: FaceId) -> Vec<(Vector3<f64>, Vector3<f64>, Vector3<f64>)> {
        let n = self.face_len(f);
        let v0 = self.vert_co(self.face_vert(f, 0));
        let mut tris = Vec::with_capacity(n.saturating_sub(2));
        for i in 1..n.saturating_sub(1) {
            let vi = self.vert_co(self.face_vert(f, i));
            let vi1 = self.vert_co(self.face_vert(f, i + 1));
            tris.push((v0, vi, vi1));
        }
        tris
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::host::SimpleHostMesh;
    use crate::mesh::spatial::LinearCoordinateIndex;
    use approx::assert_relative_eq;

    fn unit_square() -> SimpleHostMesh {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        SimpleHostMesh::from_verts_and_faces(&positions, &[vec![0, 1, 2, 3]])
    }

    #[test]
    fn face_tessellation_covers_the_face_area() {
        let host = unit_square();
        let imesh: IMesh<_, LinearCoordinateIndex> = IMesh::new(&host);
        let tris = imesh.face_tessellation(FaceId(0));
        assert_eq!(tris.len(), 2);
        let area: f64 = tris
            .iter()
            .map(|(a, b, c)| 0.5 * (b - a).cross(&(c - a)).norm())
            .sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn face_point_interior_is_the_centroid() {
        let host = unit_square();
        let imesh: IMesh<_, LinearCoordinateIndex> = IMesh::new(&host);
        let p = imesh.face_point_interior(FaceId(0));
        assert_relative_eq!(p, Vector3::new(0.5, 0.5, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn find_co_eps_finds_the_minimum_index_match() {
        let host = unit_square();
        let imesh: IMesh<_, LinearCoordinateIndex> = IMesh::new(&host);
        let found = imesh.find_co_eps([0.0, 0.0, 0.0], 1e-6).unwrap();
        assert_eq!(found, VertId(0));
        assert!(imesh.find_co_eps([5.0, 5.0, 5.0], 1e-6).is_none());
    }

    #[test]
    fn face_plane_passes_through_face_vertices() {
        let host = unit_square();
        let imesh: IMesh<_, LinearCoordinateIndex> = IMesh::new(&host);
        let plane = imesh.face_plane(FaceId(0));
        for i in 0..4 {
            let v = imesh.vert_co(imesh.face_vert(FaceId(0), i));
            assert_relative_eq!(plane.signed_distance(v), 0.0, epsilon = 1e-9);
        }
    }
}
