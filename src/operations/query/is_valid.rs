use crate::error::{Result, TopologyError};
use crate::mesh::EditableMesh;

use super::sort_edges::boundary_loops;

/// Validates the bookkeeping of a whole mesh.
///
/// Checks that every face has triangles, that no triangle repeats a corner
/// or references a missing vertex, and that the shared vertex index
/// partitions every vertex entry.
#[derive(Default)]
pub struct ValidateMesh {
    boundary_loops: bool,
}

impl ValidateMesh {
    /// Creates a new `ValidateMesh` query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also require every face boundary to decompose into closed loops.
    #[must_use]
    pub fn with_boundary_loops(mut self) -> Self {
        self.boundary_loops = true;
        self
    }

    /// Executes the validation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for dangling vertex references and
    /// `InvalidTopology` for the first other inconsistency found.
    pub fn execute(&self, mesh: &EditableMesh) -> Result<()> {
        for (_, face) in mesh.faces() {
            if !face.is_valid() {
                return Err(TopologyError::InvalidTopology(
                    "face is empty or has a degenerate triangle".into(),
                )
                .into());
            }
            for &v in face.distinct_indices() {
                mesh.check_vertex(v)?;
            }
            if self.boundary_loops {
                boundary_loops(face.boundary_edges())?;
            }
        }
        mesh.shared().check_consistency(mesh.vertex_count())
    }
}
