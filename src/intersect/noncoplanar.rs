//! The non-coplanar parts intersection path: clips each part's
//! faces against the other part's plane along their shared line, producing
//! intersection verts/edges staged into the change buffer.
//!
//! Per `DESIGN.md`'s open-question resolution, face clipping is restricted
//! to convex faces, matching the source's asserted restriction rather than
//! implementing general-polygon ray-cast parity.
//! Under that restriction a face always contributes zero, one, or two
//! intersection hits (a single parameter interval along the line), which
//! also means the second open question - multi-interval x multi-interval
//! merging - never arises from a conforming convex input; the hit-count
//! guard below exists purely as a defensive net.

use nalgebra::Vector3;

use crate::change::MeshChange;
use crate::data::ExtIndex;
use crate::geom::{plane_plane_intersect, segment_line_closest, segment_plane_intersect, Line, Plane};
use crate::mesh::{CoordinateIndex, EdgeId, FaceId, HostMesh, IMesh, VertId};
use crate::intersect::pair::PartPartIntersect;
use crate::parts::MeshPart;
use crate::trace::Trace;

pub fn intersect_noncoplanar<H: HostMesh, C: CoordinateIndex>(
    imesh: &IMesh<H, C>,
    a: &MeshPart,
    b: &MeshPart,
    a_index: usize,
    b_index: usize,
    eps: f64,
    change: &mut MeshChange,
    trace: &mut Trace,
) -> PartPartIntersect {
    let mut result = PartPartIntersect::new(a_index, b_index);

    let line = match plane_plane_intersect(&a.plane, &b.plane, eps) {
        Some(line) => line,
        None => return result,
    };

    for &v in a.verts.iter().chain(b.verts.iter()) {
        let co = imesh.vert_co(VertId(v));
        if line.distance_to_point(co) <= eps {
            result.verts.insert(v);
        }
    }

    for &e in a.edges.iter().chain(b.edges.iter()) {
        classify_loose_edge(imesh, e, &line, eps, &mut result, change);
    }

    let a_intervals: Vec<(usize, (f64, f64))> = a
        .faces
        .iter()
        .filter_map(|&f| face_interval(imesh, FaceId(f), &b.plane, &line, eps, trace).map(|iv| (f, iv)))
        .collect();
    let b_intervals: Vec<(usize, (f64, f64))> = b
        .faces
        .iter()
        .filter_map(|&f| face_interval(imesh, FaceId(f), &a.plane, &line, eps, trace).map(|iv| (f, iv)))
        .collect();

    for &(_af, (alo, ahi)) in &a_intervals {
        for &(_bf, (blo, bhi)) in &b_intervals {
            clip_interval_pair(imesh, alo, ahi, blo, bhi, &line, eps, &mut result, change);
        }
    }

    result
}

/// Per-face intersection interval along `line`. Returns `None` if the face
/// does not meet the line, or if more than two hits were found (logged as
/// an open case rather than guessed at).
fn face_interval<H: HostMesh, C: CoordinateIndex>(
    imesh: &IMesh<H, C>,
    face: FaceId,
    other_plane: &Plane,
    line: &Line,
    eps: f64,
    trace: &mut Trace,
) -> Option<(f64, f64)> {
    let n = imesh.face_len(face);
    let mut on_line = vec![false; n];
    let mut hits = Vec::new();

    for i in 0..n {
        let co = imesh.vert_co(imesh.face_vert(face, i));
        if line.distance_to_point(co) <= eps {
            on_line[i] = true;
            hits.push(line.param_of(co));
        }
    }

    for i in 0..n {
        let j = (i + 1) % n;
        if on_line[i] && on_line[j] {
            continue;
        }
        let va = imesh.face_vert(face, i);
        let vb = imesh.face_vert(face, j);
        // Order endpoints by vertex index for determinism: the same edge tested from either adjoining face must agree.
        let (pa, pb) = if va.0 <= vb.0 {
            (imesh.vert_co(va), imesh.vert_co(vb))
        } else {
            (imesh.vert_co(vb), imesh.vert_co(va))
        };
        if let Some(t) = segment_plane_intersect(pa, pb, other_plane, eps) {
            let point = pa + (pb - pa) * t;
            hits.push(line.param_of(point));
        }
    }

    if hits.is_empty() {
        return None;
    }
    hits.sort_by(|x, y| x.partial_cmp(y).expect("finite parameter"));
    let mut deduped = Vec::with_capacity(hits.len());
    for h in hits {
        if deduped.last().map_or(true, |&last: &f64| (h - last).abs() > eps) {
            deduped.push(h);
        }
    }

    match deduped.len() {
        1 => Some((deduped[0], deduped[0])),
        2 => Some((deduped[0], deduped[1])),
        n if n > 2 => {
            trace.note_open_case("non-convex face produced more than two intersection hits");
            None
        }
        _ => None,
    }
}

fn clip_interval_pair<H: HostMesh, C: CoordinateIndex>(
    imesh: &IMesh<H, C>,
    alo: f64,
    ahi: f64,
    blo: f64,
    bhi: f64,
    line: &Line,
    eps: f64,
    result: &mut PartPartIntersect,
    change: &mut MeshChange,
) {
    let lo = alo.max(blo);
    let hi = ahi.min(bhi);
    if lo > hi + eps {
        return;
    }
    if (hi - lo).abs() <= eps {
        let v = snap_or_stage_vertex(imesh, change, line.point_at(lo), eps);
        result.verts.insert(v);
        return;
    }
    let v1 = snap_or_stage_vertex(imesh, change, line.point_at(lo), eps);
    let v2 = snap_or_stage_vertex(imesh, change, line.point_at(hi), eps);
    if v1 == v2 {
        result.verts.insert(v1);
        return;
    }
    result.verts.insert(v1);
    result.verts.insert(v2);
    let edge = ensure_edge(imesh, change, v1, v2);
    result.edges.insert(edge);
    change.intersection_edges.insert(edge);
}

fn classify_loose_edge<H: HostMesh, C: CoordinateIndex>(
    imesh: &IMesh<H, C>,
    e: usize,
    line: &Line,
    eps: f64,
    result: &mut PartPartIntersect,
    change: &mut MeshChange,
) {
    let (va, vb) = imesh.edge_verts(EdgeId(e));
    let pa = imesh.vert_co(va);
    let pb = imesh.vert_co(vb);
    let on_a = line.distance_to_point(pa) <= eps;
    let on_b = line.distance_to_point(pb) <= eps;
    if on_a && on_b {
        result.edges.insert(e);
        result.verts.insert(va.0);
        result.verts.insert(vb.0);
    } else if on_a {
        result.verts.insert(va.0);
    } else if on_b {
        result.verts.insert(vb.0);
    } else {
        let (ps, pl, t) = segment_line_closest(pa, pb, line);
        if (ps - pl).norm() <= eps && t >= -eps && t <= 1.0 + eps {
            let v = snap_or_stage_vertex(imesh, change, ps, eps);
            result.verts.insert(v);
        }
    }
}

fn snap_or_stage_vertex<H: HostMesh, C: CoordinateIndex>(imesh: &IMesh<H, C>, change: &mut MeshChange, p: Vector3<f64>, eps: f64) -> ExtIndex {
    let co = [p.x, p.y, p.z];
    if let Some(v) = imesh.find_co_eps(co, eps) {
        return v.0;
    }
    change.add.add_vert(co, None, true, eps)
}

fn ensure_edge<H: HostMesh, C: CoordinateIndex>(imesh: &IMesh<H, C>, change: &mut MeshChange, v1: ExtIndex, v2: ExtIndex) -> ExtIndex {
    if v1 < imesh.totvert() && v2 < imesh.totvert() {
        if let Some(e) = imesh.find_edge(VertId(v1), VertId(v2)) {
            return e.0;
        }
    }
    change.add.add_edge(v1, v2, None)
}
