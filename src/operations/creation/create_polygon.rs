use crate::error::{GeometryError, Result};
use crate::math::polygon_3d::polygon_normal;
use crate::math::Vector3;
use crate::mesh::{EditableMesh, Face, FaceId, MaterialId, VertexId};
use crate::tessellation::TriangulatePolygon;

/// Creates a face from an ordered ring of existing vertices, with optional
/// hole rings.
pub struct CreatePolygon {
    outer: Vec<VertexId>,
    holes: Vec<Vec<VertexId>>,
    extra_triangles: Vec<[VertexId; 3]>,
    normal: Option<Vector3>,
    material: MaterialId,
    manual_uv: bool,
}

impl CreatePolygon {
    /// Creates a new `CreatePolygon` operation.
    #[must_use]
    pub fn new(outer: Vec<VertexId>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
            extra_triangles: Vec::new(),
            normal: None,
            material: MaterialId::default(),
            manual_uv: false,
        }
    }

    #[must_use]
    pub fn with_holes(mut self, holes: Vec<Vec<VertexId>>) -> Self {
        self.holes = holes;
        self
    }

    /// Triangles appended verbatim after triangulation.
    #[must_use]
    pub fn with_extra_triangles(mut self, triangles: Vec<[VertexId; 3]>) -> Self {
        self.extra_triangles = triangles;
        self
    }

    /// Orientation of the new face. Defaults to the Newell normal of the
    /// outer ring.
    #[must_use]
    pub fn with_normal(mut self, normal: Vector3) -> Self {
        self.normal = Some(normal);
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = material;
        self
    }

    #[must_use]
    pub fn with_manual_uv(mut self, manual_uv: bool) -> Self {
        self.manual_uv = manual_uv;
        self
    }

    /// Builds the face without inserting it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown vertices, `Degenerate` if no normal can
    /// be derived, and `TriangulationFailure` if the rings cannot be
    /// triangulated.
    pub fn prepare(&self, mesh: &EditableMesh) -> Result<Face> {
        let normal = match self.normal {
            Some(n) => n,
            None => {
                let ring = self
                    .outer
                    .iter()
                    .map(|&v| mesh.position(v))
                    .collect::<Result<Vec<_>>>()?;
                polygon_normal(&ring)
                    .ok_or_else(|| GeometryError::Degenerate("polygon has no area".into()))?
            }
        };
        let mut triangles =
            TriangulatePolygon::new(self.outer.clone(), self.holes.clone(), normal).execute(mesh)?;
        triangles.extend_from_slice(&self.extra_triangles);
        Ok(Face::new(triangles, self.material, self.manual_uv))
    }

    /// Builds the face and inserts it into the mesh.
    ///
    /// # Errors
    ///
    /// See [`CreatePolygon::prepare`].
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<FaceId> {
        let face = self.prepare(mesh)?;
        mesh.add_face(face)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::mesh::Vertex;
    use crate::operations::query::{FaceNormal, SortEdgesByAdjacency};

    fn add(mesh: &mut EditableMesh, pts: &[(f64, f64)]) -> Vec<VertexId> {
        pts.iter()
            .map(|&(x, y)| mesh.add_vertex(Vertex::new(Point3::new(x, y, 0.0))))
            .collect()
    }

    #[test]
    fn concave_polygon() {
        let mut mesh = EditableMesh::new();
        let ring = add(&mut mesh, &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (1.0, 1.0), (0.0, 2.0)]);
        let face = CreatePolygon::new(ring).execute(&mut mesh).unwrap();
        assert_eq!(mesh.face(face).unwrap().triangles().len(), 3);
        assert_eq!(SortEdgesByAdjacency::new(face).execute(&mesh).unwrap().len(), 5);
    }

    #[test]
    fn polygon_with_hole_follows_requested_normal() {
        let mut mesh = EditableMesh::new();
        let outer = add(&mut mesh, &[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0)]);
        let hole = add(&mut mesh, &[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]);
        let face = CreatePolygon::new(outer)
            .with_holes(vec![hole])
            .with_normal(-Vector3::z())
            .execute(&mut mesh)
            .unwrap();
        assert_eq!(mesh.face(face).unwrap().boundary_edges().len(), 8);
        let n = FaceNormal::new(face).execute(&mesh).unwrap();
        assert!(n.z < 0.0);
    }

    #[test]
    fn collinear_ring_is_degenerate() {
        let mut mesh = EditableMesh::new();
        let ring = add(&mut mesh, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(CreatePolygon::new(ring).execute(&mut mesh).is_err());
        assert_eq!(mesh.face_count(), 0);
    }
}
