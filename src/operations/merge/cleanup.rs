use std::collections::HashSet;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::mesh::{EditableMesh, FaceId, VertexId};

/// Removes triangles with two or more corners in one shared group.
///
/// Faces left without triangles are deleted, and vertices that only the
/// pruned triangles referenced are compacted away.
#[derive(Default)]
pub struct RemoveDegenerateTriangles;

impl RemoveDegenerateTriangles {
    /// Creates a new `RemoveDegenerateTriangles` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the pruning, returning the removed vertex ids (as they were
    /// numbered before compaction).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a face references an ungrouped vertex.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Vec<VertexId>> {
        let mut degenerate: Vec<(FaceId, Vec<bool>)> = Vec::new();
        for (id, face) in mesh.faces() {
            let mut keep = Vec::with_capacity(face.triangles().len());
            for &[a, b, c] in face.triangles() {
                let (ga, gb, gc) = (mesh.group_of(a)?, mesh.group_of(b)?, mesh.group_of(c)?);
                keep.push(ga != gb && gb != gc && ga != gc);
            }
            if keep.contains(&false) {
                degenerate.push((id, keep));
            }
        }

        let mut touched: HashSet<VertexId> = HashSet::new();
        let mut pruned = 0usize;
        for (id, keep) in degenerate {
            let face = mesh.face_mut(id)?;
            let mut flags = keep.into_iter();
            let removed = face.retain_triangles(|_| flags.next().unwrap_or(true));
            pruned += removed.len();
            touched.extend(removed.into_iter().flatten());
            if face.triangles().is_empty() {
                mesh.remove_face(id)?;
            }
        }

        let used = mesh.used_vertices();
        let orphaned: Vec<VertexId> = touched.into_iter().filter(|v| !used.contains(v)).collect();
        let removed = mesh.delete_vertex_entries(&orphaned);
        if pruned > 0 {
            debug!(triangles = pruned, vertices = removed.len(), "pruned degenerate triangles");
        }
        Ok(removed)
    }
}

/// Removes every vertex entry no face references.
#[derive(Default)]
pub struct RemoveUnusedVertices;

impl RemoveUnusedVertices {
    /// Creates a new `RemoveUnusedVertices` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the cleanup, returning the removed ids (pre-compaction).
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible for parity with other operations.
    #[allow(clippy::unnecessary_wraps)]
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Vec<VertexId>> {
        let used = mesh.used_vertices();
        let unused: Vec<VertexId> = (0..mesh.vertex_count())
            .map(VertexId::new)
            .filter(|v| !used.contains(v))
            .collect();
        Ok(mesh.delete_vertex_entries(&unused))
    }
}

/// Removes specific vertex entries that no face references.
pub struct DeleteVertices {
    ids: Vec<VertexId>,
}

impl DeleteVertices {
    /// Creates a new `DeleteVertices` operation.
    #[must_use]
    pub fn new(ids: Vec<VertexId>) -> Self {
        Self { ids }
    }

    /// Executes the deletion, returning the removed ids, sorted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and `InvalidTopology` if a face
    /// still references one of them.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Vec<VertexId>> {
        let used = mesh.used_vertices();
        for &v in &self.ids {
            mesh.check_vertex(v)?;
            if used.contains(&v) {
                return Err(TopologyError::InvalidTopology(format!(
                    "vertex {v} is still referenced by a face"
                ))
                .into());
            }
        }
        Ok(mesh.delete_vertex_entries(&self.ids))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::mesh::Vertex;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn quad_soup() -> EditableMesh {
        let positions = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        EditableMesh::from_triangles(&positions, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn unused_vertices_are_compacted() {
        let mut mesh = quad_soup();
        let stray = mesh.add_vertex(Vertex::new(p(5.0, 5.0)));
        let removed = RemoveUnusedVertices::new().execute(&mut mesh).unwrap();
        assert_eq!(removed, vec![stray]);
        assert_eq!(mesh.vertex_count(), 4);
        mesh.shared().check_consistency(4).unwrap();
    }

    #[test]
    fn referenced_vertex_cannot_be_deleted() {
        let mut mesh = quad_soup();
        let err = DeleteVertices::new(vec![VertexId::new(0)]).execute(&mut mesh).unwrap_err();
        assert!(err.is_invalid_topology());
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn unknown_vertex_is_not_found() {
        let mut mesh = quad_soup();
        let err = DeleteVertices::new(vec![VertexId::new(9)]).execute(&mut mesh).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn collapsed_triangle_is_pruned() {
        let mut mesh = quad_soup();
        mesh.shared_mut().union(&[VertexId::new(1), VertexId::new(2)]).unwrap();
        let removed = RemoveDegenerateTriangles::new().execute(&mut mesh).unwrap();
        assert_eq!(removed, vec![VertexId::new(1)]);
        let (_, face) = mesh.faces().next().unwrap();
        assert_eq!(face.triangles().len(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }
}
