use crate::error::Result;
use crate::math::polygon_3d::{barycentric_2d, point_in_triangle_2d};
use crate::math::projection::ProjectionAxis;
use crate::math::{Point2, Point3, Vector2, Vector3};
use crate::mesh::{EditableMesh, FaceId, Vertex, VertexId};
use crate::operations::query::face_normal;
use crate::operations::retriangulate::{average_color, AppendPoints};

/// Adds an interior point to a face by re-triangulating it.
pub struct InsertFreePoint {
    face: FaceId,
    position: Point3,
    normal: Vector3,
}

/// Result of [`InsertFreePoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreePointInsertion {
    /// The new vertex.
    pub vertex: VertexId,
    /// The face that replaced the target face.
    pub face: FaceId,
}

impl InsertFreePoint {
    /// Creates a new `InsertFreePoint` operation.
    #[must_use]
    pub fn new(face: FaceId, position: Point3, normal: Vector3) -> Self {
        Self {
            face,
            position,
            normal,
        }
    }

    /// Executes the insertion.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`AppendPoints`].
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<FreePointInsertion> {
        let appended = AppendPoints::new(self.face, vec![self.position]).execute(mesh)?;
        let vertex = appended.vertices[0];
        mesh.set_normal(vertex, Some(self.normal))?;
        Ok(FreePointInsertion {
            vertex,
            face: appended.face,
        })
    }
}

/// Creates a vertex over a face without touching the face's triangles.
///
/// UV and color are interpolated from the face triangle under the point, or
/// averaged over the face when no triangle contains it. The vertex starts in
/// its own shared group.
pub struct InsertDetachedVertex {
    face: FaceId,
    position: Point3,
    normal: Option<Vector3>,
}

impl InsertDetachedVertex {
    /// Creates a new `InsertDetachedVertex` operation.
    #[must_use]
    pub fn new(face: FaceId, position: Point3) -> Self {
        Self {
            face,
            position,
            normal: None,
        }
    }

    /// Sets the vertex normal. Defaults to the face normal.
    #[must_use]
    pub fn with_normal(mut self, normal: Vector3) -> Self {
        self.normal = Some(normal);
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist and `Degenerate` if it
    /// has no area.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<VertexId> {
        let face = mesh.face(self.face)?;
        let face_n = face_normal(mesh, face)?;
        let axis = ProjectionAxis::from_normal(&face_n);
        let q = axis.project(&self.position);

        let mut attributes = None;
        for &[a, b, c] in face.triangles() {
            let (pa, pb, pc) = (
                axis.project(&mesh.position(a)?),
                axis.project(&mesh.position(b)?),
                axis.project(&mesh.position(c)?),
            );
            if !point_in_triangle_2d(&q, &pa, &pb, &pc) {
                continue;
            }
            if let Some((u, v, w)) = barycentric_2d(&q, &pa, &pb, &pc) {
                let uv = mesh.uv(a)?.coords * u + mesh.uv(b)?.coords * v + mesh.uv(c)?.coords * w;
                let color = mesh.color(a)? * u + mesh.color(b)? * v + mesh.color(c)? * w;
                attributes = Some((Point2::from(uv), color));
                break;
            }
        }

        let (uv, color) = match attributes {
            Some(found) => found,
            None => {
                let ids = face.distinct_indices();
                let mut sum = Vector2::zeros();
                for &v in ids {
                    sum += mesh.uv(v)?.coords;
                }
                #[allow(clippy::cast_precision_loss)]
                let count = ids.len().max(1) as f64;
                (Point2::from(sum / count), average_color(mesh, ids)?)
            }
        };

        let vertex = Vertex::new(self.position)
            .with_uv(uv)
            .with_color(color)
            .with_normal(self.normal.unwrap_or(face_n));
        Ok(mesh.add_vertex(vertex))
    }
}
