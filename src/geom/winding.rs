//! Generalized winding number, via the Van Oosterom-Strackee
//! solid angle formula.

use nalgebra::Vector3;

/// Solid angle subtended by triangle `(a, b, c)` as seen from the origin,
/// using the Van Oosterom-Strackee formula. `a`, `b`, `c` are expected to
/// already be translated so the query point is the origin.
pub fn solid_angle(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> f64 {
    let a_len = a.norm();
    let b_len = b.norm();
    let c_len = c.norm();
    let numerator = a.dot(&b.cross(&c));
    let mut denom = a_len * b_len * c_len + a.dot(&b) * c_len + a.dot(&c) * b_len + b.dot(&c) * a_len;
    if denom == 0.0 {
        denom = 1e-10;
    }
    2.0 * numerator.atan2(denom)
}

/// Sums the solid angle contribution of a triangle fan (the mesh
/// tessellation of one face) into a running generalized winding number
/// total, flipping the sign when `negate` is set.
pub fn accumulate_face_contribution(
    point: Vector3<f64>,
    triangles: &[(Vector3<f64>, Vector3<f64>, Vector3<f64>)],
    negate: bool,
    gwn: &mut f64,
) {
    for &(p1, p2, p3) in triangles {
        let mut contribution = solid_angle(p1 - point, p2 - point, p3 - point);
        if negate {
            contribution = -contribution;
        }
        *gwn += contribution;
    }
}

/// Finalizes an accumulated solid-angle sum into the `[-1, 1]`-ish
/// generalized winding number.
pub fn finalize_gwn(accumulated_solid_angle: f64) -> f64 {
    accumulated_solid_angle / (4.0 * std::f64::consts::PI)
}

/// The `|gwn| >= 0.5` inside/outside test.
pub fn is_inside(gwn: f64) -> bool {
    gwn.abs() >= 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube_triangles(lo: f64, hi: f64) -> Vec<(Vector3<f64>, Vector3<f64>, Vector3<f64>)> {
        let v = |x: f64, y: f64, z: f64| Vector3::new(x, y, z);
        let c = [
            v(lo, lo, lo),
            v(hi, lo, lo),
            v(hi, hi, lo),
            v(lo, hi, lo),
            v(lo, lo, hi),
            v(hi, lo, hi),
            v(hi, hi, hi),
            v(lo, hi, hi),
        ];
        let quads: [[usize; 4]; 6] = [
            [0, 3, 2, 1], // bottom, outward normal -z
            [4, 5, 6, 7], // top, +z
            [0, 1, 5, 4], // -y
            [2, 3, 7, 6], // +y
            [1, 2, 6, 5], // +x
            [0, 4, 7, 3], // -x
        ];
        let mut tris = Vec::new();
        for q in quads.iter() {
            tris.push((c[q[0]], c[q[1]], c[q[2]]));
            tris.push((c[q[0]], c[q[2]], c[q[3]]));
        }
        tris
    }

    #[test]
    fn point_inside_closed_cube_has_gwn_near_one() {
        let tris = cube_triangles(-1.0, 1.0);
        let point = Vector3::new(0.0, 0.0, 0.0);
        let mut total = 0.0;
        accumulate_face_contribution(point, &tris, false, &mut total);
        let gwn = finalize_gwn(total);
        assert_relative_eq!(gwn.abs(), 1.0, epsilon = 1e-6);
        assert!(is_inside(gwn));
    }

    #[test]
    fn point_outside_closed_cube_has_gwn_near_zero() {
        let tris = cube_triangles(-1.0, 1.0);
        let point = Vector3::new(10.0, 10.0, 10.0);
        let mut total = 0.0;
        accumulate_face_contribution(point, &tris, false, &mut total);
        let gwn = finalize_gwn(total);
        assert_relative_eq!(gwn, 0.0, epsilon = 1e-6);
        assert!(!is_inside(gwn));
    }

    #[test]
    fn negate_flips_sign_of_contribution() {
        let tris = cube_triangles(-1.0, 1.0);
        let point = Vector3::new(0.0, 0.0, 0.0);
        let mut positive = 0.0;
        accumulate_face_contribution(point, &tris, false, &mut positive);
        let mut negated = 0.0;
        accumulate_face_contribution(point, &tris, true, &mut negated);
        assert_relative_eq!(positive, -negated, epsilon = 1e-9);
    }
}
