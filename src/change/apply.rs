//! The change applier: commits a `MeshChange` to the host mesh
//! in phases. The phase order is mandatory - side-flag tags must be
//! recoverable after reindexing, and new elements must never reference a
//! deleted original.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::change::change::MeshChange;
use crate::data::SideFlags;
use crate::error::BooleanError;
use crate::index::resolve_merge;
use crate::mesh::{EdgeId, FaceId, HostMesh, VertId};

pub fn apply<H: HostMesh>(host: &mut H, change: &MeshChange) -> Result<(), BooleanError> {
    let totvert0 = change.add.base_vert();
    let totedge0 = change.add.base_edge();
    let totface0 = change.add.base_face();

    // Phase 1: create new vertices.
    let mut vert_map: HashMap<usize, VertId> = (0..totvert0).map(|i| (i, VertId(i))).collect();
    for (local, sv) in change.add.verts().iter().enumerate() {
        let ext = totvert0 + local;
        let id = host.create_vert(sv.co, sv.example.map(VertId));
        vert_map.insert(ext, id);
    }
    debug!("apply: created {} vertices", change.add.verts().len());

    // Phase 2: create new edges, resolving merged endpoints. A vertex
    // staged while retessellating one part can be merged into another
    // vertex while retessellating a later part sharing the same merge map,
    // so an edge that was valid when staged can legitimately end up with
    // equal endpoints by the time it is applied. That is degenerate
    // geometry, not an invariant violation: it is dropped silently, and any
    // face referencing it is dropped below rather than the whole call
    // failing.
    let mut edge_map: HashMap<usize, EdgeId> = (0..totedge0).map(|i| (i, EdgeId(i))).collect();
    for (local, se) in change.add.edges().iter().enumerate() {
        let ext = totedge0 + local;
        let v1 = resolved_vert(se.v1, &change.merge_map, &vert_map)?;
        let v2 = resolved_vert(se.v2, &change.merge_map, &vert_map)?;
        if v1 == v2 {
            debug!("apply: dropping degenerate edge {} (endpoints merged together)", ext);
            continue;
        }
        let id = host.create_edge(v1, v2, se.example.map(EdgeId));
        edge_map.insert(ext, id);
    }
    debug!("apply: created {} edges", change.add.edges().len());

    // Phase 3: create new faces, consolidating side flags from examples.
    // Skip a face whose vertices collapsed together (zero area) or that
    // references an edge dropped as degenerate above, instead of failing.
    for (local, sf) in change.add.faces().iter().enumerate() {
        let ext = totface0 + local;

        let mut verts_h = Vec::with_capacity(sf.verts.len());
        for &v in &sf.verts {
            verts_h.push(resolved_vert(v, &change.merge_map, &vert_map)?);
        }
        if has_duplicate_vert(&verts_h) {
            debug!("apply: dropping degenerate face {} (vertices merged together)", ext);
            continue;
        }
        let mut edges_h = Vec::with_capacity(sf.edges.len());
        let mut degenerate = false;
        for &e in &sf.edges {
            match edge_map.get(&e) {
                Some(&id) => edges_h.push(id),
                None => {
                    degenerate = true;
                    break;
                }
            }
        }
        if degenerate {
            debug!("apply: dropping face {} referencing a dropped degenerate edge", ext);
            continue;
        }

        let new_id = host.create_face(&verts_h, &edges_h, sf.example.map(FaceId));

        if let Some(example_ext) = sf.example {
            let mut flags = host.face_side_flags(FaceId(example_ext));
            let mut normals = vec![Vector3::from(host.face_normal(FaceId(example_ext)))];
            for &other in &sf.other_examples {
                flags = flags.union(host.face_side_flags(FaceId(other)));
                normals.push(Vector3::from(host.face_normal(FaceId(other))));
            }
            let opp_normals = normals.windows(2).any(|pair| pair[0].dot(&pair[1]) < 0.0);
            host.set_face_side_flags(new_id, flags.with(SideFlags::OPP_NORMALS, opp_normals));
        }

        if change.flip_faces.contains(ext) {
            host.flip_face_normal(new_id);
        }
    }
    debug!("apply: created {} faces", change.add.faces().len());

    // Tag intersection edges before the delete/reindex phases touch the
    // extended-index space.
    for ext in change.intersection_edges.iter() {
        let id = *edge_map.get(&ext).ok_or(BooleanError::MissingMapEntry { index: ext })?;
        host.tag_intersection_edge(id);
    }

    // Phase 4: flip remaining original faces, then delete faces, edges,
    // verts in that order (so deletions never dangle a reference).
    for f in 0..totface0 {
        if change.flip_faces.contains(f) {
            host.flip_face_normal(FaceId(f));
        }
    }
    for f in change.delete.deleted_faces() {
        host.kill_face(FaceId(f), change.kill_loose);
    }
    for e in change.delete.deleted_edges() {
        host.kill_edge(EdgeId(e), change.kill_loose);
    }
    for v in change.delete.deleted_verts() {
        host.kill_vert(VertId(v));
    }
    debug!(
        "apply: deleted {} faces, {} edges, {} verts",
        change.delete.deleted_faces().count(),
        change.delete.deleted_edges().count(),
        change.delete.deleted_verts().count()
    );

    // Phase 5: reindex. Side-flag tags are stashed on the host's face
    // objects (set in phase 3, or earlier for unmodified originals) and so
    // survive this compaction without a separate rebuild step here.
    host.reindex();

    Ok(())
}

fn resolved_vert(ext: usize, merge_map: &crate::index::IntIntMap, vert_map: &HashMap<usize, VertId>) -> Result<VertId, BooleanError> {
    let canonical = resolve_merge(ext, merge_map)?;
    vert_map.get(&canonical).copied().ok_or(BooleanError::MissingMapEntry { index: canonical })
}

fn has_duplicate_vert(verts: &[VertId]) -> bool {
    let mut seen = std::collections::HashSet::with_capacity(verts.len());
    !verts.iter().all(|v| seen.insert(v.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::change::MeshChange;
    use crate::mesh::SimpleHostMesh;

    #[test]
    fn stages_a_new_disjoint_triangle() {
        let _ = env_logger::try_init();
        let mut host = SimpleHostMesh::new();
        let mut change = MeshChange::new(host.totvert(), host.totedge(), host.totface(), false);

        let a = change.add.add_vert([0.0, 0.0, 0.0], None, false, 1e-6);
        let b = change.add.add_vert([1.0, 0.0, 0.0], None, false, 1e-6);
        let c = change.add.add_vert([0.0, 1.0, 0.0], None, false, 1e-6);
        let e1 = change.add.add_edge(a, b, None);
        let e2 = change.add.add_edge(b, c, None);
        let e3 = change.add.add_edge(c, a, None);
        change.add.add_face(vec![a, b, c], vec![e1, e2, e3], None, vec![]).unwrap();

        apply(&mut host, &change).unwrap();
        assert_eq!(host.totvert(), 3);
        assert_eq!(host.totedge(), 3);
        assert_eq!(host.totface(), 1);
    }

    #[test]
    fn merged_vertex_resolves_to_its_canonical_target() {
        let _ = env_logger::try_init();
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let mut host = SimpleHostMesh::from_verts_and_faces(&positions, &[vec![0, 1, 2]]);
        let mut change = MeshChange::new(host.totvert(), host.totedge(), host.totface(), false);

        // Stage a brand-new triangle that reuses vertex 0 via a merge entry
        // from a throwaway staged vertex, exercising `resolve_merge`.
        let dup = change.add.add_vert([5.0, 5.0, 5.0], None, false, 1e-6);
        change.merge_map.set(dup, 0);
        let b = change.add.add_vert([2.0, 0.0, 0.0], None, false, 1e-6);
        let c = change.add.add_vert([0.0, 2.0, 0.0], None, false, 1e-6);
        let e1 = change.add.add_edge(dup, b, None);
        let e2 = change.add.add_edge(b, c, None);
        let e3 = change.add.add_edge(c, dup, None);
        change.add.add_face(vec![dup, b, c], vec![e1, e2, e3], None, vec![]).unwrap();

        apply(&mut host, &change).unwrap();
        // `dup` resolved to vertex 0, so only two new vertices were created.
        assert_eq!(host.totvert(), 5);
    }
}
