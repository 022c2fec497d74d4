//! Supporting planes and the coplanarity predicate.

use nalgebra::Vector3;

/// A plane in Hessian normal form: `dot(normal, x) == offset` for every
/// point `x` on the plane, with `normal` unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    /// Builds the plane through `point` with the given (not necessarily
    /// unit) normal; returns `None` if the normal is degenerate.
    pub fn from_point_normal(point: Vector3<f64>, normal: Vector3<f64>) -> Option<Plane> {
        let len = normal.norm();
        if len <= f64::EPSILON {
            return None;
        }
        let n = normal / len;
        let offset = n.dot(&point);
        Some(Plane { normal: n, offset })
    }

    /// Builds the supporting plane of a polygon from three of its vertices,
    /// in winding order, via the cross product of two edge vectors.
    pub fn from_triangle(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Option<Plane> {
        let normal = (b - a).cross(&(c - a));
        Plane::from_point_normal(a, normal)
    }

    pub fn signed_distance(&self, point: Vector3<f64>) -> f64 {
        self.normal.dot(&point) - self.offset
    }

    /// Picks a canonical representation of the plane (a plane and its
    /// negation describe the same set of points): negate in place if the
    /// first non-zero component in the sequence `(offset, z, y, x)` is
    /// positive. Used to key a coplanar-plane dedup index.
    pub fn canonicalize(&self) -> Plane {
        let do_negate = if self.offset != 0.0 {
            self.offset > 0.0
        } else if self.normal.z != 0.0 {
            self.normal.z > 0.0
        } else if self.normal.y != 0.0 {
            self.normal.y > 0.0
        } else {
            self.normal.x > 0.0
        };
        if do_negate {
            Plane {
                normal: -self.normal,
                offset: -self.offset,
            }
        } else {
            *self
        }
    }

    /// Four components `[normal.x, normal.y, normal.z, offset]`, the key
    /// coordinates used by the 4-D plane index.
    pub fn as_vec4(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.offset]
    }

    /// The `planes_are_coplanar` predicate: two planes with unit normals
    /// are coplanar iff their normals are parallel (up to
    /// `eps`) and their offsets agree once one is flipped to match the
    /// other's normal orientation.
    pub fn is_coplanar_with(&self, other: &Plane, eps: f64) -> bool {
        let cos = self.normal.dot(&other.normal);
        if cos.abs() < 1.0 - eps {
            return false;
        }
        let sign = if cos >= 0.0 { 1.0 } else { -1.0 };
        (self.offset - sign * other.offset).abs() <= eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn canonicalize_is_idempotent() {
        let p = Plane {
            normal: Vector3::new(0.0, 0.0, 1.0),
            offset: 2.0,
        };
        let c1 = p.canonicalize();
        let c2 = c1.canonicalize();
        assert_relative_eq!(c1.normal, c2.normal);
        assert_relative_eq!(c1.offset, c2.offset);
        // offset < 0 after canonicalization since original offset was positive.
        assert!(c1.offset <= 0.0);
    }

    #[test]
    fn opposite_planes_are_coplanar() {
        let a = Plane {
            normal: Vector3::new(0.0, 0.0, 1.0),
            offset: 1.0,
        };
        let b = Plane {
            normal: Vector3::new(0.0, 0.0, -1.0),
            offset: -1.0,
        };
        assert!(a.is_coplanar_with(&b, 1e-6));
    }

    #[test]
    fn tilted_planes_are_not_coplanar() {
        let a = Plane {
            normal: Vector3::new(0.0, 0.0, 1.0),
            offset: 1.0,
        };
        let b = Plane {
            normal: Vector3::new(0.0, 1.0, 0.0),
            offset: 1.0,
        };
        assert!(!a.is_coplanar_with(&b, 1e-6));
    }

    #[test]
    fn triangle_plane_matches_point_normal_form() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);
        let plane = Plane::from_triangle(a, b, c).unwrap();
        assert_relative_eq!(plane.normal, Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(plane.offset, 0.0);
    }
}
