use crate::error::Result;
use crate::mesh::{EditableMesh, Face, FaceId};

/// Removes a face. Its vertices stay in the mesh until a cleanup pass.
pub struct DeleteFace {
    face: FaceId,
}

impl DeleteFace {
    /// Creates a new `DeleteFace` operation.
    #[must_use]
    pub fn new(face: FaceId) -> Self {
        Self { face }
    }

    /// Executes the operation, returning the removed face.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Face> {
        mesh.remove_face(self.face)
    }
}
