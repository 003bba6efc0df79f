use super::{Point2, Point3, Vector3, TOLERANCE};

/// Unnormalized normal of triangle `a, b, c` (counter-clockwise front side).
#[must_use]
pub fn triangle_normal(a: &Point3, b: &Point3, c: &Point3) -> Vector3 {
    (b - a).cross(&(c - a))
}

/// Newell normal of a closed polygon, normalized.
///
/// Returns `None` when the polygon has no area (fewer than 3 points or all
/// points collinear).
#[must_use]
pub fn polygon_normal(points: &[Point3]) -> Option<Vector3> {
    if points.len() < 3 {
        return None;
    }
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let cur = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (cur.y - next.y) * (cur.z + next.z);
        normal.y += (cur.z - next.z) * (cur.x + next.x);
        normal.z += (cur.x - next.x) * (cur.y + next.y);
    }
    normal.try_normalize(TOLERANCE)
}

/// Arithmetic mean of a set of points.
#[must_use]
pub fn centroid(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / points.len() as f64;
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum * inv))
}

/// Barycentric coordinates of `p` in the 2D triangle `a, b, c`.
///
/// Returns `None` for a degenerate triangle.
#[must_use]
pub fn barycentric_2d(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> Option<(f64, f64, f64)> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let denom = v0.perp(&v1);
    if denom.abs() < TOLERANCE {
        return None;
    }
    let v = v2.perp(&v1) / denom;
    let w = v0.perp(&v2) / denom;
    Some((1.0 - v - w, v, w))
}

/// Returns `true` if `p` lies inside or on the 2D triangle `a, b, c`.
#[must_use]
pub fn point_in_triangle_2d(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    barycentric_2d(p, a, b, c).is_some_and(|(u, v, w)| {
        let eps = 1e-9;
        u >= -eps && v >= -eps && w >= -eps
    })
}

/// Twice the signed area of a 2D polygon; positive when counter-clockwise.
#[must_use]
pub fn signed_area_2d(polygon: &[Point2]) -> f64 {
    let n = polygon.len();
    (0..n)
        .map(|i| polygon[i].coords.perp(&polygon[(i + 1) % n].coords))
        .sum()
}

/// Point-in-polygon test by winding number. Non-zero means inside.
#[must_use]
pub fn point_in_polygon_2d(point: &Point2, polygon: &[Point2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    winding_number_2d(point, polygon) != 0
}

fn winding_number_2d(p: &Point2, verts: &[Point2]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let a = &verts[i];
        let b = &verts[(i + 1) % n];
        let side = (b - a).perp(&(p - a));

        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding
}
