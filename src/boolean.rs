//! The top-level entry point: wires the mesh abstraction,
//! parts, part-pair intersector, planar retessellator, change applier and
//! winding classifier into the two-commit control flow.

pub use crate::classify::BooleanOp;
pub use crate::mesh::Side;

use crate::change::{self, MeshChange};
use crate::classify;
use crate::data::{Eps, SideFlags};
use crate::error::BooleanError;
use crate::geom::Plane;
use crate::intersect::{intersect_coplanar, intersect_noncoplanar, PartPartIntersect};
use crate::mesh::{Aabb, FaceId, HostMesh, IMesh, LinearCoordinateIndex, LinearOverlap, LinearPlaneIndex, Overlap};
use crate::parts::{MeshPart, MeshPartSet};
use crate::trace::Trace;

/// Explicit configuration for one [`boolean()`] call.
#[derive(Debug, Clone, Copy)]
pub struct BooleanOptions {
    pub eps: Eps,
    pub op: BooleanOp,
    /// Overrides `side_predicate`, putting every face on both sides, for
    /// detecting and resolving a single mesh's self-intersections.
    pub use_self: bool,
    /// Accepted for interface parity with the source entry point; the
    /// source itself never reads this parameter (`UNUSED(use_separate)`
    /// in `BM_mesh_boolean`), so it has no effect here either.
    pub use_separate: bool,
}

impl Default for BooleanOptions {
    fn default() -> Self {
        BooleanOptions {
            eps: 1e-6,
            op: BooleanOp::Intersect,
            use_self: false,
            use_separate: false,
        }
    }
}

/// Runs one boolean operation against `mesh`, returning whether anything
/// changed. `side_predicate` assigns each original face to side A, side B,
/// or ignored; it is not consulted when `options.use_self` is set.
pub fn boolean<H: HostMesh>(mesh: &mut H, side_predicate: impl Fn(FaceId) -> Side, options: &BooleanOptions) -> Result<bool, BooleanError> {
    let mut trace = Trace::new();
    boolean_with_trace(mesh, side_predicate, options, &mut trace)
}

/// Like [`boolean`], but records coarse counters into the supplied
/// [`Trace`] as the call proceeds.
pub fn boolean_with_trace<H: HostMesh>(
    mesh: &mut H,
    side_predicate: impl Fn(FaceId) -> Side,
    options: &BooleanOptions,
    trace: &mut Trace,
) -> Result<bool, BooleanError> {
    seed_side_flags(mesh, &side_predicate, options.use_self);

    let mut change = MeshChange::new(mesh.totvert(), mesh.totedge(), mesh.totface(), false);
    {
        let imesh: IMesh<H, LinearCoordinateIndex> = IMesh::new(mesh);
        let (parts, records) = build_parts_and_intersections(&imesh, options, &mut change, trace);

        for (index, part) in parts.iter().enumerate() {
            let touching: Vec<&PartPartIntersect> = records.iter().filter(|r| r.a_index == index || r.b_index == index).collect();
            crate::retess::retessellate_part::<_, _, crate::retess::SpadeCdt>(&imesh, part, &touching, options.eps, &mut change, trace)?;
        }
    }
    let intersect_changed = !change.add.faces().is_empty() || change.delete.deleted_faces().next().is_some();
    change::apply(mesh, &change)?;

    let classify_changed = if options.op != BooleanOp::None {
        classify::classify_and_apply(mesh, options.op, trace)?
    } else {
        false
    };

    Ok(intersect_changed || classify_changed)
}

fn seed_side_flags<H: HostMesh>(mesh: &mut H, side_predicate: &impl Fn(FaceId) -> Side, use_self: bool) {
    for f in 0..mesh.totface() {
        let face = FaceId(f);
        let flags = if use_self {
            SideFlags::SIDE_A.union(SideFlags::SIDE_B)
        } else {
            match side_predicate(face) {
                Side::A => SideFlags::SIDE_A,
                Side::B => SideFlags::SIDE_B,
                Side::Ignored => SideFlags::NONE,
            }
        };
        mesh.set_face_side_flags(face, flags);
    }
}

/// Builds the part set(s) for this call and computes every overlapping
/// part pair's intersection record, staging new geometry into `change`
/// along the way. Returns the parts in a stable global order together with
/// the records referencing that order — `records[k].a_index`/`b_index` are
/// indices into the returned `parts` vector.
fn build_parts_and_intersections<H: HostMesh>(
    imesh: &IMesh<H, LinearCoordinateIndex>,
    options: &BooleanOptions,
    change: &mut MeshChange,
    trace: &mut Trace,
) -> (Vec<MeshPart>, Vec<PartPartIntersect>) {
    let totface = imesh.totface();

    let (parts, cross_only_below): (Vec<MeshPart>, Option<usize>) = if options.use_self {
        let faces: Vec<FaceId> = (0..totface).map(FaceId).collect();
        let set = MeshPartSet::build::<_, _, LinearPlaneIndex>(imesh, &faces, options.eps);
        (set.parts, None)
    } else {
        let a_faces: Vec<FaceId> = (0..totface)
            .map(FaceId)
            .filter(|&f| imesh.host().face_side_flags(f).contains(SideFlags::SIDE_A))
            .collect();
        let b_faces: Vec<FaceId> = (0..totface)
            .map(FaceId)
            .filter(|&f| imesh.host().face_side_flags(f).contains(SideFlags::SIDE_B))
            .collect();
        let a_set = MeshPartSet::build::<_, _, LinearPlaneIndex>(imesh, &a_faces, options.eps);
        let b_set = MeshPartSet::build::<_, _, LinearPlaneIndex>(imesh, &b_faces, options.eps);
        let split = a_set.parts.len();
        let mut combined = a_set.parts;
        combined.extend(b_set.parts);
        (combined, Some(split))
    };
    trace.parts_built += parts.len();

    let boxes: Vec<(usize, Aabb)> = parts.iter().enumerate().filter_map(|(i, p)| p.aabb.map(|b| (i, b))).collect();
    let overlap = LinearOverlap::build(&boxes);
    let pairs = overlap.overlapping_pairs();

    let mut records = Vec::new();
    for (i, j) in pairs {
        if let Some(split) = cross_only_below {
            // Two-sided mode: only cross-set (A, B) pairs are meaningful;
            // an AABB coincidence within one side's own part set never
            // represents a boolean-relevant crossing.
            if (i < split) == (j < split) {
                continue;
            }
        }
        trace.part_pairs_tested += 1;
        let record = intersect_pair(imesh, &parts[i], &parts[j], i, j, options.eps, change, trace);
        if !record.verts.is_empty() || !record.edges.is_empty() || !record.faces.is_empty() {
            trace.part_pairs_intersected += 1;
        }
        records.push(record);
    }

    (parts, records)
}

fn intersect_pair<H: HostMesh>(
    imesh: &IMesh<H, LinearCoordinateIndex>,
    a: &MeshPart,
    b: &MeshPart,
    a_index: usize,
    b_index: usize,
    eps: f64,
    change: &mut MeshChange,
    trace: &mut Trace,
) -> PartPartIntersect {
    if coplanar(&a.plane, &b.plane, eps) {
        intersect_coplanar(a, b, a_index, b_index)
    } else {
        intersect_noncoplanar(imesh, a, b, a_index, b_index, eps, change, trace)
    }
}

fn coplanar(a: &Plane, b: &Plane, eps: f64) -> bool {
    a.is_coplanar_with(b, eps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SimpleHostMesh;

    fn two_overlapping_cubes() -> SimpleHostMesh {
        // A unit cube [0,1]^3 (side A) overlapping a unit cube [0.5,1.5]^3
        // (side B), one shared box's worth of overlap.
        fn cube(lo: f64, hi: f64) -> (Vec<[f64; 3]>, Vec<Vec<usize>>) {
            let c = [
                [lo, lo, lo],
                [hi, lo, lo],
                [hi, hi, lo],
                [lo, hi, lo],
                [lo, lo, hi],
                [hi, lo, hi],
                [hi, hi, hi],
                [lo, hi, hi],
            ];
            let faces = vec![
                vec![0, 3, 2, 1],
                vec![4, 5, 6, 7],
                vec![0, 1, 5, 4],
                vec![2, 3, 7, 6],
                vec![1, 2, 6, 5],
                vec![0, 4, 7, 3],
            ];
            (c.to_vec(), faces)
        }
        let (pa, fa) = cube(0.0, 1.0);
        let (pb, fb) = cube(0.5, 1.5);
        let mut positions = pa;
        let base = positions.len();
        positions.extend(pb);
        let mut faces = fa;
        for f in fb {
            faces.push(f.into_iter().map(|v| v + base).collect());
        }
        SimpleHostMesh::from_verts_and_faces(&positions, &faces)
    }

    fn tetrahedron(offset: [f64; 3]) -> (Vec<[f64; 3]>, Vec<Vec<usize>>) {
        let v = |x: f64, y: f64, z: f64| [offset[0] + x, offset[1] + y, offset[2] + z];
        let positions = vec![v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 1.0)];
        let faces = vec![vec![0, 2, 1], vec![0, 1, 3], vec![0, 3, 2], vec![1, 2, 3]];
        (positions, faces)
    }

    fn two_disjoint_tetrahedra() -> SimpleHostMesh {
        let (pa, fa) = tetrahedron([0.0, 0.0, 0.0]);
        let (pb, fb) = tetrahedron([100.0, 100.0, 100.0]);
        let mut positions = pa;
        let base = positions.len();
        positions.extend(pb);
        let mut faces = fa;
        for f in fb {
            faces.push(f.into_iter().map(|v| v + base).collect());
        }
        SimpleHostMesh::from_verts_and_faces(&positions, &faces)
    }

    #[test]
    fn disjoint_tetrahedra_union_keeps_every_face() {
        let mut host = two_disjoint_tetrahedra();
        let options = BooleanOptions {
            eps: 1e-6,
            op: BooleanOp::Union,
            use_self: false,
            use_separate: false,
        };
        let changed = boolean(&mut host, |f| if f.0 < 4 { Side::A } else { Side::B }, &options).unwrap();
        assert!(!changed);
        assert_eq!(host.totface(), 8);
    }

    #[test]
    fn disjoint_tetrahedra_intersection_removes_everything() {
        let mut host = two_disjoint_tetrahedra();
        let options = BooleanOptions {
            eps: 1e-6,
            op: BooleanOp::Intersect,
            use_self: false,
            use_separate: false,
        };
        let changed = boolean(&mut host, |f| if f.0 < 4 { Side::A } else { Side::B }, &options).unwrap();
        assert!(changed);
        assert_eq!(host.totface(), 0);
    }

    #[test]
    fn union_of_two_overlapping_cubes_runs_to_completion() {
        let mut host = two_overlapping_cubes();
        let options = BooleanOptions {
            eps: 1e-6,
            op: BooleanOp::Union,
            use_self: false,
            use_separate: false,
        };
        // Exercises the full pipeline end to end on genuinely crossing
        // geometry; the disjoint-tetrahedra tests above pin the exact
        // face-count behavior more tightly.
        let result = boolean(&mut host, |f| if f.0 < 6 { Side::A } else { Side::B }, &options);
        assert!(result.is_ok());
    }

    #[test]
    fn op_none_only_tags_intersections() {
        let mut host = two_overlapping_cubes();
        let options = BooleanOptions {
            eps: 1e-6,
            op: BooleanOp::None,
            use_self: false,
            use_separate: false,
        };
        let result = boolean(&mut host, |f| if f.0 < 6 { Side::A } else { Side::B }, &options);
        assert!(result.is_ok());
    }
}
