//! The planar retessellator: projects a part plus its
//! accumulated intersection loci to 2-D, triangulates through the
//! [`ConstrainedTriangulator`] capability trait, and maps the result back
//! into the change buffer as staged verts/edges/faces.

pub mod cdt;

pub use cdt::{CdtInput, CdtOutput, ConstrainedTriangulator, SpadeCdt};

use std::collections::{HashMap, HashSet};

use nalgebra::Vector3;

use crate::change::MeshChange;
use crate::data::ExtIndex;
use crate::geom::Plane;
use crate::index::IndexedIntSet;
use crate::intersect::PartPartIntersect;
use crate::mesh::{CoordinateIndex, EdgeId, FaceId, HostMesh, IMesh, VertId};
use crate::parts::MeshPart;
use crate::trace::Trace;

/// An orthonormal 2-D frame in the part's plane: `normal == u.cross(v)`.
struct PlaneFrame {
    origin: Vector3<f64>,
    u: Vector3<f64>,
    v: Vector3<f64>,
}

impl PlaneFrame {
    fn for_plane(plane: &Plane) -> PlaneFrame {
        let normal = plane.normal;
        let helper = if normal.z.abs() < 0.9 { Vector3::z() } else { Vector3::x() };
        let u = normal.cross(&helper).normalize();
        let v = normal.cross(&u).normalize();
        PlaneFrame {
            origin: normal * plane.offset,
            u,
            v,
        }
    }

    fn project(&self, p: Vector3<f64>) -> (f64, f64) {
        let d = p - self.origin;
        (d.dot(&self.u), d.dot(&self.v))
    }

    fn unproject(&self, p: (f64, f64)) -> Vector3<f64> {
        self.origin + self.u * p.0 + self.v * p.1
    }
}

fn vert_position<H: HostMesh, C: CoordinateIndex>(imesh: &IMesh<H, C>, change: &MeshChange, ext: ExtIndex) -> Vector3<f64> {
    if ext < imesh.totvert() {
        imesh.vert_co(VertId(ext))
    } else {
        Vector3::from(change.add.vert(ext).co)
    }
}

fn edge_endpoints<H: HostMesh, C: CoordinateIndex>(imesh: &IMesh<H, C>, change: &MeshChange, ext: ExtIndex) -> (ExtIndex, ExtIndex) {
    if ext < imesh.totedge() {
        let (a, b) = imesh.edge_verts(EdgeId(ext));
        (a.0, b.0)
    } else {
        let e = change.add.edge(ext);
        (e.v1, e.v2)
    }
}

fn unordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Point-in-convex-polygon test via consistent cross-product sign (valid
/// for the convex faces this engine stages; see `retess`'s module docs and
/// `intersect::noncoplanar`'s resolution of the non-convex-face open
/// question).
fn point_in_convex_polygon(point: (f64, f64), poly: &[(f64, f64)], eps: f64) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let mut sign = 0.0f64;
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        let edge = (b.0 - a.0, b.1 - a.1);
        let to_point = (point.0 - a.0, point.1 - a.1);
        let cross = edge.0 * to_point.1 - edge.1 * to_point.0;
        if cross.abs() <= eps {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Retessellates one part, staging replacement geometry into `change` and
/// marking the part's original faces for deletion. `records` is every
/// intersection record touching this part (as either its `a_index` or
/// `b_index`).
pub fn retessellate_part<H: HostMesh, C: CoordinateIndex, T: ConstrainedTriangulator>(
    imesh: &IMesh<H, C>,
    part: &MeshPart,
    records: &[&PartPartIntersect],
    eps: f64,
    change: &mut MeshChange,
    trace: &mut Trace,
) -> Result<(), crate::error::BooleanError> {
    // Step 1: gather needed verts/edges/faces, uniqued into indexed sets.
    let mut verts = IndexedIntSet::new();
    let mut edges = IndexedIntSet::new();
    let mut faces: Vec<usize> = Vec::new();
    let mut seen_faces: HashSet<usize> = HashSet::new();

    for &f in &part.faces {
        if seen_faces.insert(f) {
            faces.push(f);
        }
        let n = imesh.face_len(FaceId(f));
        for i in 0..n {
            verts.insert(imesh.face_vert(FaceId(f), i).0);
            edges.insert(imesh.host().face_edge(FaceId(f), i).0);
        }
    }
    for &v in &part.verts {
        verts.insert(v);
    }
    for &e in &part.edges {
        edges.insert(e);
    }
    for record in records {
        for v in record.verts.iter() {
            verts.insert(v);
        }
        for e in record.edges.iter() {
            let (a, b) = edge_endpoints(imesh, change, e);
            verts.insert(a);
            verts.insert(b);
            edges.insert(e);
        }
        for f in record.faces.iter() {
            if seen_faces.insert(f) {
                faces.push(f);
            }
        }
    }
    faces.sort_unstable();

    if faces.is_empty() {
        return Ok(());
    }

    // Step 2: project into the part's plane.
    let frame = PlaneFrame::for_plane(&part.plane);
    let points: Vec<(f64, f64)> = verts.iter().map(|ext| frame.project(vert_position(imesh, change, ext))).collect();
    let constraint_edges: Vec<(usize, usize)> = edges
        .iter()
        .map(|ext| {
            let (a, b) = edge_endpoints(imesh, change, ext);
            (verts.rank_of(a).expect("vertex gathered"), verts.rank_of(b).expect("vertex gathered"))
        })
        .collect();

    // Step 3: triangulate.
    let input = CdtInput { points, constraint_edges };
    let output = T::triangulate(&input);
    debug!(
        "retess: part with {} faces -> {} input points, {} output triangles",
        faces.len(),
        input.points.len(),
        output.triangles.len()
    );

    // Step 4a: resolve output-point provenance into extended indices,
    // merging duplicate originals onto the lowest extended index, and
    // remember which output point each input rank landed on.
    let mut output_ext: Vec<ExtIndex> = Vec::with_capacity(output.points.len());
    let mut rank_to_output: Vec<usize> = vec![0; verts.len()];
    for (i, origins) in output.point_origins.iter().enumerate() {
        if origins.is_empty() {
            let p3 = frame.unproject(output.points[i]);
            let ext = change.add.add_vert([p3.x, p3.y, p3.z], None, true, eps);
            output_ext.push(ext);
            continue;
        }
        let origin_exts: Vec<ExtIndex> = origins.iter().map(|&rank| verts.value_at(rank).expect("valid rank")).collect();
        let canonical = *origin_exts.iter().min().expect("non-empty origins");
        for (&rank, &ext) in origins.iter().zip(origin_exts.iter()) {
            rank_to_output[rank] = i;
            if ext != canonical {
                change.merge_map.set(ext, canonical);
                if ext < imesh.totvert() {
                    change.delete.mark_vert(ext);
                }
            }
        }
        output_ext.push(canonical);
    }

    // Step 4b: output edges. Edges whose endpoints are unchanged reuse the
    // original; edges whose endpoints moved (merge) or are brand new are
    // staged fresh, and their original (if any) is marked deleted.
    let mut edge_for_pair: HashMap<(ExtIndex, ExtIndex), ExtIndex> = HashMap::new();
    for ext in edges.iter() {
        let (orig_a, orig_b) = edge_endpoints(imesh, change, ext);
        let ra = verts.rank_of(orig_a).expect("vertex gathered");
        let rb = verts.rank_of(orig_b).expect("vertex gathered");
        let resolved_a = output_ext[rank_to_output[ra]];
        let resolved_b = output_ext[rank_to_output[rb]];
        if resolved_a == resolved_b {
            if ext < imesh.totedge() {
                change.delete.mark_edge(ext);
            }
            continue;
        }
        let key = unordered(resolved_a, resolved_b);
        if resolved_a == orig_a && resolved_b == orig_b {
            edge_for_pair.entry(key).or_insert(ext);
        } else {
            let staged = change.add.add_edge(resolved_a, resolved_b, Some(ext));
            edge_for_pair.insert(key, staged);
            if ext < imesh.totedge() {
                change.delete.mark_edge(ext);
            }
        }
    }

    let mut ensure_edge = |change: &mut MeshChange, a: ExtIndex, b: ExtIndex| -> ExtIndex {
        let key = unordered(a, b);
        if let Some(&ext) = edge_for_pair.get(&key) {
            return ext;
        }
        let ext = change.add.add_edge(a, b, None);
        edge_for_pair.insert(key, ext);
        ext
    };

    // Precompute each candidate original face's projected polygon once.
    let projected_faces: Vec<(usize, Vec<(f64, f64)>)> = faces
        .iter()
        .map(|&f| {
            let n = imesh.face_len(FaceId(f));
            let poly = (0..n).map(|i| frame.project(imesh.vert_co(imesh.face_vert(FaceId(f), i)))).collect();
            (f, poly)
        })
        .collect();

    // Step 4c: output faces.
    for tri in &output.triangles {
        let tri_ext = [output_ext[tri[0]], output_ext[tri[1]], output_ext[tri[2]]];
        if tri_ext[0] == tri_ext[1] || tri_ext[1] == tri_ext[2] || tri_ext[0] == tri_ext[2] {
            continue; // degenerate after merge resolution
        }
        let centroid = (
            (output.points[tri[0]].0 + output.points[tri[1]].0 + output.points[tri[2]].0) / 3.0,
            (output.points[tri[0]].1 + output.points[tri[1]].1 + output.points[tri[2]].1) / 3.0,
        );
        let mut containing: Vec<usize> = projected_faces
            .iter()
            .filter(|(_, poly)| point_in_convex_polygon(centroid, poly, eps))
            .map(|(f, _)| *f)
            .collect();
        containing.sort_unstable();

        if containing.is_empty() {
            // The CDT fills the part's full convex hull, not just the union
            // of its faces' footprints, so a triangle can legitimately fall
            // in a hull gap between two faces that don't share a hull (e.g.
            // two separate coplanar faces with space between them). Routine,
            // not one of the documented open cases: discard quietly.
            debug!("retess: discarding output triangle matching no original face (hull gap)");
            continue;
        }
        let example = containing[0];
        let other_examples = containing[1..].to_vec();

        let edge_ab = ensure_edge(change, tri_ext[0], tri_ext[1]);
        let edge_bc = ensure_edge(change, tri_ext[1], tri_ext[2]);
        let edge_ca = ensure_edge(change, tri_ext[2], tri_ext[0]);

        change
            .add
            .add_face(tri_ext.to_vec(), vec![edge_ab, edge_bc, edge_ca], Some(example), other_examples)?;
        trace.faces_retessellated += 1;
    }

    // Step 5: mark every original face gathered for this part as deleted.
    for &f in &faces {
        if f < imesh.totface() {
            change.delete.mark_face(f);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{LinearCoordinateIndex, SimpleHostMesh};

    #[test]
    fn retessellating_a_single_untouched_face_reproduces_it() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let host = SimpleHostMesh::from_verts_and_faces(&positions, &[vec![0, 1, 2, 3]]);
        let imesh: IMesh<_, LinearCoordinateIndex> = IMesh::new(&host);
        let plane = imesh.face_plane(FaceId(0));
        let mut part = MeshPart::new(plane);
        part.faces = vec![0];

        let mut change = MeshChange::new(host.totvert(), host.totedge(), host.totface(), false);
        let mut trace = Trace::new();
        retessellate_part::<_, _, SpadeCdt>(&imesh, &part, &[], 1e-6, &mut change, &mut trace).unwrap();

        assert!(change.delete.is_face_deleted(0));
        assert!(!change.add.faces().is_empty());
    }

    #[test]
    fn unreferenced_part_with_no_faces_is_a_no_op() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]];
        let host = SimpleHostMesh::from_verts_and_faces(&positions, &[vec![0, 1, 2]]);
        let imesh: IMesh<_, LinearCoordinateIndex> = IMesh::new(&host);
        let plane = imesh.face_plane(FaceId(0));
        let part = MeshPart::new(plane);

        let mut change = MeshChange::new(host.totvert(), host.totedge(), host.totface(), false);
        let mut trace = Trace::new();
        retessellate_part::<_, _, SpadeCdt>(&imesh, &part, &[], 1e-6, &mut change, &mut trace).unwrap();

        assert!(change.add.faces().is_empty());
        assert!(!change.delete.is_face_deleted(0));
    }
}
