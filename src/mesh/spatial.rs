//! Spatial index capability traits: a
//! coordinate k-d tree, a 4-D plane index, and AABB overlap are explicitly
//! out of scope as *production* data structures - the engine only needs
//! the query surface, modeled as traits so a host can plug in a real
//! k-d tree or BVH. The `Linear*` types are the naive reference
//! implementations that ship so the crate is runnable standalone; they are
//! documented as such, not a performance claim.

use crate::data::Position;

/// An axis-aligned bounding box, already inflated by whatever epsilon the
/// caller wants baked in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Position,
    pub max: Position,
}

impl Aabb {
    pub fn from_points<I: IntoIterator<Item = Position>>(points: I) -> Option<Aabb> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for p in iter {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some(Aabb { min, max })
    }

    pub fn inflated(&self, eps: f64) -> Aabb {
        Aabb {
            min: [self.min[0] - eps, self.min[1] - eps, self.min[2] - eps],
            max: [self.max[0] + eps, self.max[1] + eps, self.max[2] + eps],
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            max: [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }
}

/// Nearest-coordinate lookup by absolute (L-infinity) tolerance, built once
/// per `boolean()` call over the host mesh's *original* vertex positions
///.
pub trait CoordinateIndex {
    fn build(points: &[(usize, Position)]) -> Self
    where
        Self: Sized;

    /// The minimum-index point within `eps` (L-infinity) of `co`, if any.
    fn find_within(&self, co: Position, eps: f64) -> Option<usize>;
}

#[derive(Debug, Default, Clone)]
pub struct LinearCoordinateIndex {
    points: Vec<(usize, Position)>,
}

impl CoordinateIndex for LinearCoordinateIndex {
    fn build(points: &[(usize, Position)]) -> Self {
        LinearCoordinateIndex {
            points: points.to_vec(),
        }
    }

    fn find_within(&self, co: Position, eps: f64) -> Option<usize> {
        self.points
            .iter()
            .filter(|(_, p)| linf_distance(*p, co) <= eps)
            .map(|(id, _)| *id)
            .min()
    }
}

fn linf_distance(a: Position, b: Position) -> f64 {
    (0..3).map(|i| (a[i] - b[i]).abs()).fold(0.0, f64::max)
}

/// Range search over canonicalized plane 4-vectors `[nx, ny, nz, offset]`
///, used to find coplanarity candidates for a new face.
pub trait PlaneIndex {
    fn new() -> Self
    where
        Self: Sized;

    fn insert(&mut self, id: usize, plane4: [f64; 4]);

    /// All ids within Euclidean `radius` of `plane4` (a superset; the
    /// caller still applies the exact coplanarity predicate).
    fn query_within(&self, plane4: [f64; 4], radius: f64) -> Vec<usize>;
}

#[derive(Debug, Default, Clone)]
pub struct LinearPlaneIndex {
    entries: Vec<(usize, [f64; 4])>,
}

impl PlaneIndex for LinearPlaneIndex {
    fn new() -> Self {
        LinearPlaneIndex::default()
    }

    fn insert(&mut self, id: usize, plane4: [f64; 4]) {
        self.entries.push((id, plane4));
    }

    fn query_within(&self, plane4: [f64; 4], radius: f64) -> Vec<usize> {
        let mut hits: Vec<usize> = self
            .entries
            .iter()
            .filter(|(_, p)| {
                let d2: f64 = (0..4).map(|i| (p[i] - plane4[i]).powi(2)).sum();
                d2 <= radius * radius
            })
            .map(|(id, _)| *id)
            .collect();
        hits.sort_unstable();
        hits
    }
}

/// AABB overlap query over a batch of boxes.
pub trait Overlap {
    fn build(boxes: &[(usize, Aabb)]) -> Self
    where
        Self: Sized;

    /// All overlapping id pairs `(a, b)` with `a < b`, sorted
    /// lexicographically.
    fn overlapping_pairs(&self) -> Vec<(usize, usize)>;
}

#[derive(Debug, Default, Clone)]
pub struct LinearOverlap {
    boxes: Vec<(usize, Aabb)>,
}

impl Overlap for LinearOverlap {
    fn build(boxes: &[(usize, Aabb)]) -> Self {
        LinearOverlap {
            boxes: boxes.to_vec(),
        }
    }

    fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.boxes.len() {
            for j in (i + 1)..self.boxes.len() {
                let (ia, ba) = self.boxes[i];
                let (ib, bb) = self.boxes[j];
                if ba.overlaps(&bb) {
                    pairs.push(if ia < ib { (ia, ib) } else { (ib, ia) });
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_union_and_overlap() {
        let a = Aabb {
            min: [0.0, 0.0, 0.0],
            max: [1.0, 1.0, 1.0],
        };
        let b = Aabb {
            min: [0.5, 0.5, 0.5],
            max: [2.0, 2.0, 2.0],
        };
        assert!(a.overlaps(&b));
        let u = a.union(&b);
        assert_eq!(u.min, [0.0, 0.0, 0.0]);
        assert_eq!(u.max, [2.0, 2.0, 2.0]);
    }

    #[test]
    fn linear_coordinate_index_returns_min_index_within_eps() {
        let points = vec![(5usize, [0.0, 0.0, 0.0]), (2usize, [0.01, 0.0, 0.0])];
        let index = LinearCoordinateIndex::build(&points);
        assert_eq!(index.find_within([0.0, 0.0, 0.0], 0.1), Some(2));
        assert_eq!(index.find_within([10.0, 0.0, 0.0], 0.1), None);
    }

    #[test]
    fn linear_plane_index_query_is_sorted() {
        let mut index = LinearPlaneIndex::new();
        index.insert(3, [0.0, 0.0, 1.0, 0.0]);
        index.insert(1, [0.0, 0.0, 1.0, 0.0001]);
        let hits = index.query_within([0.0, 0.0, 1.0, 0.0], 0.01);
        assert_eq!(hits, vec![1, 3]);
    }

    #[test]
    fn linear_overlap_pairs_are_sorted_and_deduped_in_order() {
        let boxes = vec![
            (
                10,
                Aabb {
                    min: [0.0, 0.0, 0.0],
                    max: [1.0, 1.0, 1.0],
                },
            ),
            (
                2,
                Aabb {
                    min: [0.5, 0.5, 0.5],
                    max: [2.0, 2.0, 2.0],
                },
            ),
            (
                7,
                Aabb {
                    min: [5.0, 5.0, 5.0],
                    max: [6.0, 6.0, 6.0],
                },
            ),
        ];
        let overlap = LinearOverlap::build(&boxes);
        assert_eq!(overlap.overlapping_pairs(), vec![(2, 10)]);
    }
}
