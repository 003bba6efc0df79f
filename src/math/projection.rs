use super::{Point2, Point3, Vector3};

/// Cartesian axis a face is flattened along before planar triangulation.
///
/// The axis is the dominant component of the face normal, so the projection
/// onto the remaining two coordinates loses as little area as possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionAxis {
    X,
    Y,
    Z,
}

impl ProjectionAxis {
    /// Picks the axis matching the largest absolute component of `normal`.
    ///
    /// Ties prefer `X` over `Y` over `Z`, so the choice is deterministic.
    #[must_use]
    pub fn from_normal(normal: &Vector3) -> Self {
        let (x, y, z) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
        if x >= y && x >= z {
            Self::X
        } else if y >= z {
            Self::Y
        } else {
            Self::Z
        }
    }

    /// Unit vector of the axis.
    #[must_use]
    pub fn vector(self) -> Vector3 {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }

    /// Drops the axis coordinate of `point`.
    ///
    /// The remaining coordinates are taken in cyclic order (`YZ`, `ZX`, `XY`),
    /// which keeps counter-clockwise loops counter-clockwise when the normal
    /// points along the positive axis.
    #[must_use]
    pub fn project(self, point: &Point3) -> Point2 {
        match self {
            Self::X => Point2::new(point.y, point.z),
            Self::Y => Point2::new(point.z, point.x),
            Self::Z => Point2::new(point.x, point.y),
        }
    }

    /// Projects every point of a slice.
    #[must_use]
    pub fn project_all(self, points: &[Point3]) -> Vec<Point2> {
        points.iter().map(|p| self.project(p)).collect()
    }
}
