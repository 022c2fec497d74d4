//! Builds a set of coplanar parts for one side.

use std::collections::HashSet;

use crate::mesh::{CoordinateIndex, EdgeId, FaceId, HostMesh, IMesh, PlaneIndex, VertId};
use crate::parts::part::MeshPart;

#[derive(Debug, Clone, Default)]
pub struct MeshPartSet {
    pub parts: Vec<MeshPart>,
    pub aabb: Option<crate::mesh::Aabb>,
}

impl MeshPartSet {
    /// Builds parts from `faces` (already filtered by side mask, in input
    /// order). `P` is the plane-index implementation used for the
    /// coplanarity-candidate query.
    pub fn build<H: HostMesh, C: CoordinateIndex, P: PlaneIndex>(imesh: &IMesh<H, C>, faces: &[FaceId], eps: f64) -> MeshPartSet {
        let mut plane_index = P::new();
        let canon_planes: Vec<_> = faces
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                let plane = imesh.face_plane(f).canonicalize();
                plane_index.insert(i, plane.as_vec4());
                plane
            })
            .collect();

        let mut face_part: Vec<Option<usize>> = vec![None; faces.len()];
        let mut parts: Vec<MeshPart> = Vec::new();

        for i in 0..faces.len() {
            let plane_i = canon_planes[i];
            let mut candidates = plane_index.query_within(plane_i.as_vec4(), 10.0 * eps);
            candidates.retain(|&j| j != i && face_part[j].is_some() && plane_i.is_coplanar_with(&canon_planes[j], eps));
            candidates.sort_unstable();

            let part_idx = match candidates.into_iter().next() {
                Some(j) => face_part[j].unwrap(),
                None => {
                    parts.push(MeshPart::new(plane_i));
                    parts.len() - 1
                }
            };
            parts[part_idx].faces.push(faces[i].0);
            face_part[i] = Some(part_idx);
        }

        assign_loose_elements(imesh, faces, &canon_planes, &face_part, &mut parts, eps);

        for part in parts.iter_mut() {
            let mut points = Vec::new();
            for &f in &part.faces {
                let n = imesh.face_len(FaceId(f));
                for i in 0..n {
                    let v = imesh.vert_co(imesh.face_vert(FaceId(f), i));
                    points.push([v.x, v.y, v.z]);
                }
            }
            for &v in &part.verts {
                let v = imesh.vert_co(VertId(v));
                points.push([v.x, v.y, v.z]);
            }
            let aabb = crate::mesh::Aabb::from_points(points);
            part.aabb = aabb.map(|b| b.inflated(eps));
        }

        let set_aabb = parts
            .iter()
            .filter_map(|p| p.aabb)
            .fold(None, |acc: Option<crate::mesh::Aabb>, b| match acc {
                Some(a) => Some(a.union(&b)),
                None => Some(b),
            });

        MeshPartSet { parts, aabb: set_aabb }
    }
}

/// Loose verts/edges (not used by any face anywhere in the host mesh) that
/// happen to lie on a part's plane join that part. Ties go to the smallest part index, matching the
/// stable tie-break used for face assignment.
fn assign_loose_elements<H: HostMesh, C: CoordinateIndex>(
    imesh: &IMesh<H, C>,
    side_faces: &[FaceId],
    canon_planes: &[crate::geom::Plane],
    face_part: &[Option<usize>],
    parts: &mut [MeshPart],
    eps: f64,
) {
    let mut used_verts: HashSet<usize> = HashSet::new();
    let mut used_edges: HashSet<usize> = HashSet::new();
    for f in 0..imesh.totface() {
        let f = FaceId(f);
        let n = imesh.face_len(f);
        for i in 0..n {
            used_verts.insert(imesh.face_vert(f, i).0);
            used_edges.insert(imesh.host().face_edge(f, i).0);
        }
    }

    let _ = (side_faces, canon_planes, face_part);

    for v in 0..imesh.totvert() {
        if used_verts.contains(&v) {
            continue;
        }
        let co = imesh.vert_co(VertId(v));
        if let Some(idx) = best_part_for_point(parts, [co.x, co.y, co.z], eps) {
            parts[idx].verts.push(v);
        }
    }

    for e in 0..imesh.totedge() {
        if used_edges.contains(&e) {
            continue;
        }
        let (a, b) = imesh.edge_verts(EdgeId(e));
        let ca = imesh.vert_co(a);
        let cb = imesh.vert_co(b);
        let idx_a = best_part_for_point(parts, [ca.x, ca.y, ca.z], eps);
        let idx_b = best_part_for_point(parts, [cb.x, cb.y, cb.z], eps);
        if let (Some(ia), Some(ib)) = (idx_a, idx_b) {
            if ia == ib {
                parts[ia].edges.push(e);
            }
        }
    }
}

fn best_part_for_point(parts: &[MeshPart], co: [f64; 3], eps: f64) -> Option<usize> {
    let p = nalgebra::Vector3::from(co);
    parts
        .iter()
        .enumerate()
        .find(|(_, part)| part.plane.signed_distance(p).abs() <= eps)
        .map(|(i, _)| i)
}
