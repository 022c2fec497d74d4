//! The constrained-Delaunay-triangulation capability trait: the CDT primitive itself is an external
//! collaborator. `SpadeCdt` is the real implementation, built on the
//! `spade` crate (the CDT crate the retrieved pack's CAD/mesh repositories
//! consistently reach for).

use spade::{ConstrainedDelaunayTriangulation, Point2, Triangulation};

/// A planar straight-line graph to triangulate: 2-D points addressed by a
/// stable "rank" plus constraint
/// edges as rank pairs.
#[derive(Debug, Clone, Default)]
pub struct CdtInput {
    pub points: Vec<(f64, f64)>,
    pub constraint_edges: Vec<(usize, usize)>,
}

/// The triangulated output. `point_origins[i]` lists the input ranks that
/// collapsed onto output point `i` (empty for a brand-new Steiner point);
/// the result exposes, per output element, the list of input originals
/// that produced it, in stable order.
#[derive(Debug, Clone, Default)]
pub struct CdtOutput {
    pub points: Vec<(f64, f64)>,
    pub point_origins: Vec<Vec<usize>>,
    pub triangles: Vec<[usize; 3]>,
}

pub trait ConstrainedTriangulator {
    fn triangulate(input: &CdtInput) -> CdtOutput;
}

pub struct SpadeCdt;

impl ConstrainedTriangulator for SpadeCdt {
    fn triangulate(input: &CdtInput) -> CdtOutput {
        let mut cdt: ConstrainedDelaunayTriangulation<Point2<f64>> = ConstrainedDelaunayTriangulation::new();

        let mut rank_to_handle = Vec::with_capacity(input.points.len());
        let mut handle_origins: std::collections::HashMap<usize, Vec<usize>> = std::collections::HashMap::new();

        for (rank, &(x, y)) in input.points.iter().enumerate() {
            let handle = cdt
                .insert(Point2::new(x, y))
                .expect("finite input coordinates");
            rank_to_handle.push(handle);
            handle_origins.entry(handle.index()).or_default().push(rank);
        }

        for &(ra, rb) in &input.constraint_edges {
            let ha = rank_to_handle[ra];
            let hb = rank_to_handle[rb];
            if ha != hb {
                cdt.add_constraint(ha, hb);
            }
        }

        let mut handle_to_output: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();
        let mut points = Vec::new();
        let mut point_origins = Vec::new();
        for vertex in cdt.vertices() {
            let fix = vertex.fix().index();
            let pos = vertex.position();
            handle_to_output.insert(fix, points.len());
            points.push((pos.x, pos.y));
            let mut origins = handle_origins.get(&fix).cloned().unwrap_or_default();
            origins.sort_unstable();
            point_origins.push(origins);
        }

        let mut triangles = Vec::new();
        for face in cdt.inner_faces() {
            let verts = face.vertices();
            let idx = [
                handle_to_output[&verts[0].fix().index()],
                handle_to_output[&verts[1].fix().index()],
                handle_to_output[&verts[2].fix().index()],
            ];
            triangles.push(idx);
        }

        CdtOutput {
            points,
            point_origins,
            triangles,
        }
    }
}
