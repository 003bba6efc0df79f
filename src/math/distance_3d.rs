use super::{Point3, TOLERANCE};

/// Returns the point of segment `a`→`b` closest to `point` and its parameter
/// `t` in `[0, 1]` along the segment.
#[must_use]
pub fn closest_point_on_segment(point: &Point3, a: &Point3, b: &Point3) -> (Point3, f64) {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < TOLERANCE * TOLERANCE {
        // Degenerate segment (zero length).
        return (*a, 0.0);
    }

    // Project onto the infinite line, clamp to the segment.
    let t = ((point - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (a + d * t, t)
}

/// Returns the minimum distance from `point` to the segment `a`→`b`.
#[must_use]
pub fn point_to_segment_dist(point: &Point3, a: &Point3, b: &Point3) -> f64 {
    let (closest, _) = closest_point_on_segment(point, a, b);
    (point - closest).norm()
}

/// Per-component comparison: every coordinate differs by less than `delta`.
#[must_use]
pub fn approx_eq_3(a: &Point3, b: &Point3, delta: f64) -> bool {
    (a.x - b.x).abs() < delta && (a.y - b.y).abs() < delta && (a.z - b.z).abs() < delta
}
