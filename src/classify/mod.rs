//! The winding classifier and boolean operator: groups faces
//! that stayed on one side of every shared edge, classifies each group with
//! the generalized winding number against the opposite side, and removes or
//! flips it per the requested boolean operation.

use std::collections::HashMap;

use crate::change::MeshChange;
use crate::data::SideFlags;
use crate::error::BooleanError;
use crate::geom::{accumulate_face_contribution, finalize_gwn, is_inside};
use crate::mesh::{FaceId, HostMesh, IMesh, LinearCoordinateIndex, Side};
use crate::trace::Trace;

/// The requested boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Intersect-and-tag only: stop after committing intersection geometry.
    None,
    Intersect,
    Union,
    Diff,
}

/// Computes edge-connected face groups: two faces may join a
/// group across a shared edge only if every face in that edge's radial fan
/// carries the same [`SideFlags`] — otherwise the crossing point is a
/// genuine boundary between differently-sided surface and the group split
/// there.
fn edge_connected_face_groups<H: HostMesh>(host: &H) -> Vec<Vec<usize>> {
    let totface = host.totface();
    let mut parent: Vec<usize> = (0..totface).collect();

    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }
    fn union(parent: &mut [usize], a: usize, b: usize) {
        let ra = find(parent, a);
        let rb = find(parent, b);
        if ra != rb {
            parent[ra] = rb;
        }
    }

    let mut fans: HashMap<usize, Vec<usize>> = HashMap::new();
    for f in 0..totface {
        let n = host.face_len(FaceId(f));
        for i in 0..n {
            let e = host.face_edge(FaceId(f), i).0;
            fans.entry(e).or_default().push(f);
        }
    }

    let mut edge_ids: Vec<usize> = fans.keys().copied().collect();
    edge_ids.sort_unstable();
    for e in edge_ids {
        let faces = &fans[&e];
        if faces.len() < 2 {
            continue;
        }
        let first = host.face_side_flags(FaceId(faces[0]));
        if faces.iter().all(|&f| host.face_side_flags(FaceId(f)) == first) {
            for w in faces.windows(2) {
                union(&mut parent, w[0], w[1]);
            }
        }
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for f in 0..totface {
        let root = find(&mut parent, f);
        groups.entry(root).or_default().push(f);
    }
    let mut result: Vec<Vec<usize>> = groups.into_values().collect();
    for g in result.iter_mut() {
        g.sort_unstable();
    }
    result.sort_by_key(|g| g[0]);
    result
}

/// Which side a group's [`SideFlags`] are treated as belonging to for
/// gwn/opposite-side purposes.
///
/// The original `do_boolean_op` gates its "both sides" branch on
/// `fside & (SIDE_A & SIDE_B)`, and `SIDE_A & SIDE_B` is the empty mask, so
/// that branch is unreachable there — a face with both bits set silently
/// falls through to the ordinary per-side rule instead. This is flagged as
/// a likely bug rather than corrected (see `DESIGN.md`); a both-sides group
/// here takes the same fallthrough, treated as side A unless it carries
/// *only* the side-B bit.
fn effective_side(flags: SideFlags) -> Side {
    if flags.contains(SideFlags::SIDE_B) && !flags.contains(SideFlags::SIDE_A) {
        Side::B
    } else {
        Side::A
    }
}

fn decide(op: BooleanOp, flags: SideFlags, inside: bool) -> (bool, bool) {
    match op {
        BooleanOp::None => (false, false),
        BooleanOp::Intersect => (!inside, false),
        BooleanOp::Union => (inside, false),
        BooleanOp::Diff => match effective_side(flags) {
            Side::B => (!inside, true),
            _ => (inside, false),
        },
    }
}

/// Classifies every edge-connected face group and applies the resulting
/// removals/flips to `host`.
/// Returns whether anything changed.
pub fn classify_and_apply<H: HostMesh>(host: &mut H, op: BooleanOp, trace: &mut Trace) -> Result<bool, BooleanError> {
    let change = {
        let imesh: IMesh<H, LinearCoordinateIndex> = IMesh::new(host);
        let groups = edge_connected_face_groups(imesh.host());
        let mut change = MeshChange::new(imesh.totvert(), imesh.totedge(), imesh.totface(), true);

        for group in &groups {
            let rep = group[0];
            let flags = imesh.host().face_side_flags(FaceId(rep));
            if flags.is_empty() {
                // Ignored by the caller's side predicate: on neither
                // operand, so `do_boolean_op`'s `if (fside == 0) continue;`
                // leaves it completely untouched.
                continue;
            }
            if flags.is_both_sides() {
                trace.note_open_case("both-sides face group encountered (fside & (SIDE_A & SIDE_B) open question)");
            }
            let opposite = match effective_side(flags) {
                Side::A => Side::B,
                Side::B => Side::A,
                Side::Ignored => Side::Ignored,
            };

            let point = imesh.face_point_interior(FaceId(rep));
            let mut accumulated = 0.0;
            for f in 0..imesh.totface() {
                let f_flags = imesh.host().face_side_flags(FaceId(f));
                let on_opposite = match opposite {
                    Side::A => f_flags.contains(SideFlags::SIDE_A),
                    Side::B => f_flags.contains(SideFlags::SIDE_B),
                    Side::Ignored => false,
                };
                if !on_opposite {
                    continue;
                }
                let tris = imesh.face_tessellation(FaceId(f));
                accumulate_face_contribution(point, &tris, f_flags.contains(SideFlags::OPP_NORMALS), &mut accumulated);
            }
            let gwn = finalize_gwn(accumulated);
            let inside = is_inside(gwn);
            let (do_remove, do_flip) = decide(op, flags, inside);

            trace!(
                "classify: group of {} faces (rep={}) gwn={:.4} inside={} remove={} flip={}",
                group.len(),
                rep,
                gwn,
                inside,
                do_remove,
                do_flip
            );

            if do_remove {
                for &f in group {
                    change.delete.mark_face(f);
                }
                trace.faces_removed += group.len();
            } else if do_flip {
                for &f in group {
                    change.flip_faces.insert(f);
                }
                trace.faces_flipped += group.len();
            }
        }
        change
    };

    let changed = change.delete.deleted_faces().next().is_some() || !change.flip_faces.is_empty();
    crate::change::apply(host, &change)?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SideFlags;
    use crate::mesh::SimpleHostMesh;

    fn two_separate_triangles() -> SimpleHostMesh {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 0.0, 0.0], [6.0, 0.0, 0.0], [5.0, 1.0, 0.0]];
        SimpleHostMesh::from_verts_and_faces(&positions, &[vec![0, 1, 2], vec![3, 4, 5]])
    }

    #[test]
    fn faces_with_differing_side_flags_never_share_a_group() {
        let host = two_separate_triangles();
        let groups = edge_connected_face_groups(&host);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn ignored_face_group_is_left_untouched() {
        let mut host = two_separate_triangles();
        host.set_face_side_flags(FaceId(0), SideFlags::SIDE_A);
        // Face 1 keeps the default `SideFlags::NONE` — ignored by the
        // predicate, on neither operand. With no opposite-side geometry,
        // face 0's own group has gwn 0 (outside) and Intersect removes it;
        // the ignored group must survive untouched rather than being swept
        // up by the same rule.
        let mut trace = Trace::new();
        classify_and_apply(&mut host, BooleanOp::Intersect, &mut trace).unwrap();
        assert_eq!(host.totface(), 1);
    }

    #[test]
    fn op_none_classifies_without_removing_anything() {
        let mut host = two_separate_triangles();
        host.set_face_side_flags(FaceId(0), SideFlags::SIDE_A);
        host.set_face_side_flags(FaceId(1), SideFlags::SIDE_B);
        let mut trace = Trace::new();
        let changed = classify_and_apply(&mut host, BooleanOp::None, &mut trace).unwrap();
        assert!(!changed);
        assert_eq!(host.totface(), 2);
    }
}
