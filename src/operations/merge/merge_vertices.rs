use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::mesh::{EditableMesh, GroupId, VertexId};

use super::cleanup::RemoveDegenerateTriangles;

/// Shifts `id` down past every removed id below it; `None` if it was removed.
fn surviving(id: VertexId, removed: &[VertexId]) -> Option<VertexId> {
    if removed.binary_search(&id).is_ok() {
        return None;
    }
    let below = removed.partition_point(|r| *r < id);
    Some(VertexId::new(id.index() - below))
}

/// Merges the shared groups of a set of vertices into one, placed at the
/// centroid of their positions, then prunes collapsed triangles.
pub struct MergeVertices {
    ids: Vec<VertexId>,
}

/// Result of [`MergeVertices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The merged group, if any of its members survived pruning.
    pub group: Option<GroupId>,
    /// The first input vertex that survived, renumbered after compaction.
    pub collapsed: Option<VertexId>,
    /// Vertex ids removed by pruning (pre-compaction numbering).
    pub removed: Vec<VertexId>,
}

impl MergeVertices {
    /// Creates a new `MergeVertices` operation.
    #[must_use]
    pub fn new(ids: Vec<VertexId>) -> Self {
        Self { ids }
    }

    /// Executes the merge.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `ids` is empty or contains an unknown vertex.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<MergeOutcome> {
        for &v in &self.ids {
            mesh.check_vertex(v)?;
        }
        mesh.shared_mut().merge_groups(&self.ids)?;
        let removed = RemoveDegenerateTriangles::new().execute(mesh)?;

        let collapsed = self.ids.iter().find_map(|&v| surviving(v, &removed));
        let group = collapsed.map(|v| mesh.group_of(v)).transpose()?;
        debug!(vertices = self.ids.len(), removed = removed.len(), "merged vertices");
        Ok(MergeOutcome {
            group,
            collapsed,
            removed,
        })
    }
}

/// Welds vertices whose positions are within a distance of each other.
pub struct WeldVertices {
    ids: Vec<VertexId>,
    epsilon: f64,
}

/// Result of [`WeldVertices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeldOutcome {
    /// Groups that absorbed at least one other group and still exist.
    pub groups: Vec<GroupId>,
    /// Vertex ids removed by pruning (pre-compaction numbering).
    pub removed: Vec<VertexId>,
}

impl WeldVertices {
    /// Creates a new `WeldVertices` operation.
    #[must_use]
    pub fn new(ids: Vec<VertexId>, epsilon: f64) -> Self {
        Self { ids, epsilon }
    }

    /// Executes the weld.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `ids` contains an unknown vertex.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<WeldOutcome> {
        for &v in &self.ids {
            mesh.check_vertex(v)?;
        }
        let welded = mesh.shared_mut().weld(&self.ids, self.epsilon)?;
        let removed = RemoveDegenerateTriangles::new().execute(mesh)?;
        let live: HashSet<GroupId> = mesh.shared().groups().map(|(g, _)| g).collect();
        let groups: Vec<GroupId> = welded.into_iter().filter(|g| live.contains(g)).collect();
        debug!(groups = groups.len(), epsilon = self.epsilon, "welded vertices");
        Ok(WeldOutcome { groups, removed })
    }
}

/// Moves each vertex into its own shared group at its own stored position.
pub struct SplitVertices {
    ids: Vec<VertexId>,
}

impl SplitVertices {
    /// Creates a new `SplitVertices` operation.
    #[must_use]
    pub fn new(ids: Vec<VertexId>) -> Self {
        Self { ids }
    }

    /// Executes the split, returning the new singleton groups in input order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `ids` contains an unknown vertex.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<Vec<GroupId>> {
        let own = mesh.own_positions().to_vec();
        mesh.shared_mut().split(&self.ids, &own)
    }
}
