use crate::error::{Result, TopologyError};
use crate::math::{Point3, POSITION_EPSILON};
use crate::mesh::{EditableMesh, FaceId, VertexId};

/// Resolves a position to an existing vertex.
///
/// Searches shared group positions for the nearest one within `epsilon`.
/// Never creates a vertex.
pub struct InsertOnExistingVertex {
    position: Point3,
    epsilon: f64,
    prefer_face: Option<FaceId>,
}

impl InsertOnExistingVertex {
    /// Creates a new `InsertOnExistingVertex` operation.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            epsilon: POSITION_EPSILON,
            prefer_face: None,
        }
    }

    /// Sets the match distance.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Prefers the group member referenced by `face` when the matched group
    /// has several members.
    #[must_use]
    pub fn in_face(mut self, face: FaceId) -> Self {
        self.prefer_face = Some(face);
        self
    }

    /// Executes the lookup.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no group lies within `epsilon`, or if the
    /// preferred face does not exist.
    pub fn execute(&self, mesh: &EditableMesh) -> Result<VertexId> {
        let face = self.prefer_face.map(|f| mesh.face(f)).transpose()?;

        let mut best: Option<(f64, VertexId, &[VertexId])> = None;
        for (_, group) in mesh.shared().groups() {
            let distance = (group.position() - self.position).norm();
            if distance > self.epsilon {
                continue;
            }
            let representative = group.members()[0];
            let closer = match best {
                None => true,
                Some((d, r, _)) => (distance, representative) < (d, r),
            };
            if closer {
                best = Some((distance, representative, group.members()));
            }
        }

        let (_, representative, members) = best.ok_or_else(|| {
            TopologyError::NotFound(format!("no vertex near {:?}", self.position.coords))
        })?;
        Ok(face
            .and_then(|f| members.iter().copied().find(|&m| f.contains(m)))
            .unwrap_or(representative))
    }
}
