use crate::error::{GeometryError, Result};
use crate::math::polygon_3d::triangle_normal;
use crate::math::{Vector3, TOLERANCE};
use crate::mesh::{EditableMesh, Face, FaceId};

/// Computes the unit normal of a face from its triangles.
pub struct FaceNormal {
    face: FaceId,
}

impl FaceNormal {
    /// Creates a new `FaceNormal` query.
    #[must_use]
    pub fn new(face: FaceId) -> Self {
        Self { face }
    }

    /// Executes the query, returning the area-weighted triangle normal.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face or one of its vertices is missing, and
    /// `Degenerate` if the face has no area.
    pub fn execute(&self, mesh: &EditableMesh) -> Result<Vector3> {
        face_normal(mesh, mesh.face(self.face)?)
    }
}

pub(crate) fn face_normal(mesh: &EditableMesh, face: &Face) -> Result<Vector3> {
    let mut sum = Vector3::zeros();
    for &[a, b, c] in face.triangles() {
        sum += triangle_normal(&mesh.position(a)?, &mesh.position(b)?, &mesh.position(c)?);
    }
    sum.try_normalize(TOLERANCE)
        .ok_or_else(|| GeometryError::Degenerate("face has no area".into()).into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn tilted_quad_normal() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let mesh = EditableMesh::from_polygons(&positions, &[vec![0, 1, 2, 3]]).unwrap();
        let n = FaceNormal::new(mesh.face_ids()[0]).execute(&mesh).unwrap();
        let expected = Vector3::new(0.0, -1.0, 1.0).normalize();
        assert_relative_eq!(n, expected, epsilon = 1e-12);
    }
}
