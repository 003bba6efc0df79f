use tracing::debug;

use crate::error::Result;
use crate::mesh::{EditableMesh, Face, FaceId};
use crate::operations::CreatePolygon;

/// One pending change to a mesh.
pub enum MeshIntent {
    /// Triangulate and insert a polygon.
    AddPolygon(CreatePolygon),
    /// Remove a face.
    DeleteFace(FaceId),
}

/// Face additions and deletions applied all at once.
///
/// Every intent is validated (and every polygon triangulated) before the
/// first change is made, so a failing commit leaves the mesh as it was.
#[derive(Default)]
pub struct MeshTransaction {
    intents: Vec<MeshIntent>,
}

enum Staged {
    Add(Face),
    Delete(FaceId),
}

impl MeshTransaction {
    /// Creates an empty transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_polygon(&mut self, polygon: CreatePolygon) {
        self.intents.push(MeshIntent::AddPolygon(polygon));
    }

    pub fn delete_face(&mut self, face: FaceId) {
        self.intents.push(MeshIntent::DeleteFace(face));
    }

    /// Number of pending intents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Validates and applies every intent in order.
    ///
    /// Returns the ids of the added faces, in intent order.
    ///
    /// # Errors
    ///
    /// Returns the first validation error; the mesh is then unchanged.
    pub fn commit(self, mesh: &mut EditableMesh) -> Result<Vec<FaceId>> {
        let mut staged = Vec::with_capacity(self.intents.len());
        for intent in self.intents {
            staged.push(match intent {
                MeshIntent::AddPolygon(polygon) => Staged::Add(polygon.prepare(mesh)?),
                MeshIntent::DeleteFace(id) => {
                    mesh.face(id)?;
                    Staged::Delete(id)
                }
            });
        }

        let mut added = Vec::new();
        let mut deleted = 0usize;
        for step in staged {
            match step {
                Staged::Add(face) => added.push(mesh.add_face(face)?),
                Staged::Delete(id) => {
                    mesh.remove_face(id)?;
                    deleted += 1;
                }
            }
        }
        debug!(added = added.len(), deleted, "committed mesh transaction");
        Ok(added)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::mesh::{Vertex, VertexId};

    fn square(mesh: &mut EditableMesh, x: f64) -> Vec<VertexId> {
        [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(px, py)| mesh.add_vertex(Vertex::new(Point3::new(px + x, py, 0.0))))
            .collect()
    }

    #[test]
    fn applies_all_intents() {
        let mut mesh = EditableMesh::new();
        let a = square(&mut mesh, 0.0);
        let old = CreatePolygon::new(a.clone()).execute(&mut mesh).unwrap();

        let mut tx = MeshTransaction::new();
        tx.add_polygon(CreatePolygon::new(a));
        tx.delete_face(old);
        assert_eq!(tx.len(), 2);
        let added = tx.commit(&mut mesh).unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(mesh.face_ids(), added);
    }

    #[test]
    fn invalid_polygon_aborts_everything() {
        let mut mesh = EditableMesh::new();
        let a = square(&mut mesh, 0.0);
        let old = CreatePolygon::new(a.clone()).execute(&mut mesh).unwrap();
        let b = square(&mut mesh, 3.0);

        let mut tx = MeshTransaction::new();
        tx.delete_face(old);
        tx.add_polygon(CreatePolygon::new(b));
        tx.add_polygon(CreatePolygon::new(vec![a[0], a[1]]));
        assert!(tx.commit(&mut mesh).is_err());
        assert_eq!(mesh.face_ids(), vec![old]);
    }
}
