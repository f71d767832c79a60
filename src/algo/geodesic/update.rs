//! Local distance updates on a single triangle.
//!
//! The two-neighbor update treats the front as a plane wave crossing the
//! triangle (Kimmel & Sethian, "Computing geodesic paths on manifolds",
//! 1998). For a vertex `C` with known neighbors `A` and `B`, `T(A) <= T(B)`,
//! edge lengths `a = |CB|`, `b = |CA|`, angle `theta` at `C`, difference
//! `u = T(B) - T(A)` and weight `F` at `C`, the arrival time is `T(A) + t`
//! where `t` is the larger root of
//!
//! ```text
//! (a² + b² − 2ab cosθ) t² + 2bu (a cosθ − b) t + b² (u² − F² a² sin²θ) = 0
//! ```
//!
//! The root is only valid when the wave reaches `C` from inside the triangle.
//! Otherwise the update falls back to the cheaper of the two edges.

use nalgebra::Point3;

const DEGENERATE_EPSILON: f64 = 1e-12;

/// Arrival time at `c` along the edge from a single known vertex `x`.
#[inline]
pub(crate) fn single_neighbor(c: &Point3<f64>, x: &Point3<f64>, tx: f64, weight: f64) -> f64 {
    tx + weight * (c - x).norm()
}

/// Arrival time at `c` from two known vertices of the same triangle.
pub(crate) fn two_neighbor(
    c: &Point3<f64>,
    p: &Point3<f64>,
    tp: f64,
    q: &Point3<f64>,
    tq: f64,
    weight: f64,
) -> f64 {
    // Order so that A carries the smaller arrival time
    let (pa, ta, pb, tb) = if tp <= tq { (p, tp, q, tq) } else { (q, tq, p, tp) };

    let ca = pa - c;
    let cb = pb - c;
    let b = ca.norm();
    let a = cb.norm();

    let fallback = (ta + weight * b).min(tb + weight * a);
    if a < DEGENERATE_EPSILON || b < DEGENERATE_EPSILON {
        return fallback;
    }

    let cos = (ca.dot(&cb) / (a * b)).clamp(-1.0, 1.0);
    let sin2 = 1.0 - cos * cos;
    if sin2 < DEGENERATE_EPSILON {
        return fallback;
    }

    let u = tb - ta;
    let qa = a * a + b * b - 2.0 * a * b * cos;
    let qb = 2.0 * b * u * (a * cos - b);
    let qc = b * b * (u * u - weight * weight * a * a * sin2);

    let disc = qb * qb - 4.0 * qa * qc;
    if qa < DEGENERATE_EPSILON || disc < 0.0 {
        return fallback;
    }

    let t = (-qb + disc.sqrt()) / (2.0 * qa);

    // Upwind test: the wave direction must lie between CA and CB.
    let causal = t > u;
    let inside_b = b * (t - u) >= a * cos * t;
    let inside_a = a * t >= b * cos * (t - u);

    if causal && inside_a && inside_b {
        (ta + t).min(fallback)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn test_single_neighbor_is_weighted_edge() {
        let c = Point3::new(0.0, 0.0, 0.0);
        let x = Point3::new(3.0, 4.0, 0.0);
        assert!((single_neighbor(&c, &x, 1.0, 1.0) - 6.0).abs() < EPS);
        assert!((single_neighbor(&c, &x, 1.0, 2.0) - 11.0).abs() < EPS);
    }

    #[test]
    fn test_plane_wave_hits_right_angle() {
        // Wavefront along x + y = 1 moving toward the origin.
        let c = Point3::new(0.0, 0.0, 0.0);
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 1.0, 0.0);
        let t = two_neighbor(&c, &a, 0.0, &b, 0.0, 1.0);
        assert!((t - 0.5_f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn test_wave_parallel_to_edge_falls_back() {
        // T = 2 - x: the wave travels along CA, so the edge estimate is exact.
        let c = Point3::new(0.0, 0.0, 0.0);
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 1.0, 0.0);
        let t = two_neighbor(&c, &a, 1.0, &b, 2.0, 1.0);
        assert!((t - 2.0).abs() < EPS);
    }

    #[test]
    fn test_oblique_plane_wave_is_exact() {
        // Plane wave T(p) = n . p with n at 30 degrees; C is downstream of A and B.
        let n = nalgebra::Vector3::new(30f64.to_radians().cos(), 30f64.to_radians().sin(), 0.0);
        let time = |p: &Point3<f64>| n.dot(&p.coords);

        let c = Point3::new(1.0, 1.0, 0.0);
        let a = Point3::new(0.2, 0.9, 0.0);
        let b = Point3::new(0.9, 0.1, 0.0);
        let t = two_neighbor(&c, &a, time(&a), &b, time(&b), 1.0);
        assert!((t - time(&c)).abs() < 1e-9, "{} vs {}", t, time(&c));
    }

    #[test]
    fn test_argument_order_does_not_matter() {
        let c = Point3::new(0.3, 1.0, 0.2);
        let p = Point3::new(0.0, 0.0, 0.0);
        let q = Point3::new(1.0, 0.1, 0.0);
        let t1 = two_neighbor(&c, &p, 0.4, &q, 0.7, 1.3);
        let t2 = two_neighbor(&c, &q, 0.7, &p, 0.4, 1.3);
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_never_worse_than_edges() {
        let c = Point3::new(0.5, 0.8, 0.0);
        let p = Point3::new(0.0, 0.0, 0.0);
        let q = Point3::new(1.0, 0.0, 0.0);
        let t = two_neighbor(&c, &p, 0.0, &q, 0.3, 1.0);
        assert!(t <= single_neighbor(&c, &p, 0.0, 1.0) + EPS);
        assert!(t <= single_neighbor(&c, &q, 0.3, 1.0) + EPS);
        assert!(t >= 0.3);
    }

    #[test]
    fn test_weight_scales_result() {
        let c = Point3::new(0.0, 0.0, 0.0);
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 1.0, 0.0);
        let t1 = two_neighbor(&c, &a, 0.0, &b, 0.0, 1.0);
        let t3 = two_neighbor(&c, &a, 0.0, &b, 0.0, 3.0);
        assert!((t3 - 3.0 * t1).abs() < EPS);
    }
}
