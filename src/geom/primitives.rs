//! Small numeric geometry routines the core owns directly: plane-plane
//! intersection, segment-plane intersection, and line-line closest points.
//! Unlike the CDT primitive and spatial indices, these are not
//! treated as external collaborators - they are a handful of lines each and
//! the engine needs their exact epsilon behavior.

use nalgebra::Vector3;

use crate::geom::plane::Plane;

/// A line in parametric form `p(t) = point + t * direction`, with
/// `direction` unit length.
#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub point: Vector3<f64>,
    pub direction: Vector3<f64>,
}

impl Line {
    /// The signed parameter of `p`'s projection onto the line.
    pub fn param_of(&self, p: Vector3<f64>) -> f64 {
        (p - self.point).dot(&self.direction)
    }

    pub fn point_at(&self, t: f64) -> Vector3<f64> {
        self.point + self.direction * t
    }

    pub fn distance_to_point(&self, p: Vector3<f64>) -> f64 {
        let t = self.param_of(p);
        (p - self.point_at(t)).norm()
    }
}

/// Intersects two non-coplanar planes, returning the line they share.
/// Returns `None` if the planes are (numerically) parallel.
pub fn plane_plane_intersect(a: &Plane, b: &Plane, eps: f64) -> Option<Line> {
    let direction = a.normal.cross(&b.normal);
    let len = direction.norm();
    if len <= eps {
        return None;
    }
    let direction = direction / len;

    // Solve for a point on both planes: minimize via the standard
    // three-plane trick, using `direction` as the third plane's normal
    // anchored at the origin.
    let n1 = a.normal;
    let n2 = b.normal;
    let n3 = direction;
    let d1 = a.offset;
    let d2 = b.offset;
    let d3 = 0.0;

    let denom = n1.dot(&n2.cross(&n3));
    if denom.abs() <= f64::EPSILON {
        return None;
    }
    let point = (n2.cross(&n3) * d1 + n3.cross(&n1) * d2 + n1.cross(&n2) * d3) / denom;
    Some(Line { point, direction })
}

/// Intersects the segment `(a, b)` against `plane`: returns the
/// interpolation factor in `[0, 1]` along the segment if the segment
/// crosses the plane (not merely touches at an endpoint within `eps`),
/// else `None`.
pub fn segment_plane_intersect(a: Vector3<f64>, b: Vector3<f64>, plane: &Plane, eps: f64) -> Option<f64> {
    let da = plane.signed_distance(a);
    let db = plane.signed_distance(b);
    if da.abs() <= eps && db.abs() <= eps {
        // Segment lies in the plane; no unique crossing point.
        return None;
    }
    if da.abs() <= eps || db.abs() <= eps {
        // One endpoint is on the plane: ignore end-of-segment-only hits
        // here (they are already captured as vertex hits) to avoid double
        // counting.
        return None;
    }
    if da.signum() == db.signum() {
        return None;
    }
    let t = da / (da - db);
    Some(t.clamp(0.0, 1.0))
}

/// Closest points between a finite segment `(a, b)` and an infinite line,
/// returning `(point_on_segment, point_on_line, segment_param_in_0_1)`.
pub fn segment_line_closest(a: Vector3<f64>, b: Vector3<f64>, line: &Line) -> (Vector3<f64>, Vector3<f64>, f64) {
    let d1 = b - a;
    let d1_len = d1.norm();
    if d1_len <= f64::EPSILON {
        let t_line = line.param_of(a);
        return (a, line.point_at(t_line), 0.0);
    }
    let u = d1 / d1_len;
    let v = line.direction;
    let w0 = a - line.point;
    let uu = 1.0; // u is unit.
    let uv = u.dot(&v);
    let vv = 1.0; // v is unit.
    let uw = u.dot(&w0);
    let vw = v.dot(&w0);
    let denom = uu * vv - uv * uv;

    let s = if denom.abs() <= f64::EPSILON {
        // Parallel: project the segment midpoint.
        0.0
    } else {
        (uv * vw - vv * uw) / denom
    };
    let s_clamped = (s / d1_len).clamp(0.0, 1.0) * d1_len;
    let t = if denom.abs() <= f64::EPSILON {
        vw
    } else {
        (uu * vw - uv * uw) / denom
    };

    let point_on_segment = a + u * s_clamped;
    let point_on_line = line.point_at(t);
    (point_on_segment, point_on_line, s_clamped / d1_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_plane_intersection_is_perpendicular_to_both_normals() {
        let a = Plane {
            normal: Vector3::new(0.0, 0.0, 1.0),
            offset: 0.0,
        };
        let b = Plane {
            normal: Vector3::new(1.0, 0.0, 0.0),
            offset: 0.0,
        };
        let line = plane_plane_intersect(&a, &b, 1e-9).unwrap();
        assert_relative_eq!(line.direction.dot(&a.normal), 0.0, epsilon = 1e-9);
        assert_relative_eq!(line.direction.dot(&b.normal), 0.0, epsilon = 1e-9);
        assert_relative_eq!(a.signed_distance(line.point), 0.0, epsilon = 1e-9);
        assert_relative_eq!(b.signed_distance(line.point), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn parallel_planes_have_no_intersection_line() {
        let a = Plane {
            normal: Vector3::new(0.0, 0.0, 1.0),
            offset: 0.0,
        };
        let b = Plane {
            normal: Vector3::new(0.0, 0.0, 1.0),
            offset: 1.0,
        };
        assert!(plane_plane_intersect(&a, &b, 1e-9).is_none());
    }

    #[test]
    fn segment_plane_intersection_finds_crossing() {
        let plane = Plane {
            normal: Vector3::new(0.0, 0.0, 1.0),
            offset: 0.0,
        };
        let a = Vector3::new(0.0, 0.0, -1.0);
        let b = Vector3::new(0.0, 0.0, 1.0);
        let t = segment_plane_intersect(a, b, &plane, 1e-9).unwrap();
        assert_relative_eq!(t, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn segment_plane_ignores_endpoint_only_touch() {
        let plane = Plane {
            normal: Vector3::new(0.0, 0.0, 1.0),
            offset: 0.0,
        };
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 0.0, 1.0);
        assert!(segment_plane_intersect(a, b, &plane, 1e-9).is_none());
    }

    #[test]
    fn segment_line_closest_on_crossing_lines() {
        let line = Line {
            point: Vector3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(1.0, 0.0, 0.0),
        };
        let a = Vector3::new(0.5, -1.0, 0.0);
        let b = Vector3::new(0.5, 1.0, 0.0);
        let (ps, pl, t) = segment_line_closest(a, b, &line);
        assert_relative_eq!(ps, Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(pl, Vector3::new(0.5, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(t, 0.5, epsilon = 1e-9);
    }
}
