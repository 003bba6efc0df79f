use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::distance_3d::approx_eq_3;
use crate::math::{Point3, Vector3};

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a shared vertex group.
    pub struct GroupId;
}

/// A set of vertex entries that represent one logical point.
///
/// Members keep independent attributes (UV, normal, color); they share the
/// group's canonical position.
#[derive(Debug, Clone)]
pub struct SharedVertexGroup {
    members: Vec<VertexId>,
    position: Point3,
}

impl SharedVertexGroup {
    /// Member vertex ids. The first member is the group's representative.
    #[must_use]
    pub fn members(&self) -> &[VertexId] {
        &self.members
    }

    /// Canonical position shared by all members.
    #[must_use]
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Groups are never stored empty; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Partition of vertex ids into shared groups.
///
/// Groups live in an arena keyed by [`GroupId`]; the reverse lookup maps each
/// vertex id to its group. Every registered vertex id belongs to exactly one
/// group, and both directions are kept in agreement by every mutation.
#[derive(Debug, Clone, Default)]
pub struct SharedVertexIndex {
    groups: SlotMap<GroupId, SharedVertexGroup>,
    lookup: Vec<Option<GroupId>>,
}

impl SharedVertexIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over `positions`, grouping entries whose positions are
    /// equal within `epsilon` per component.
    #[must_use]
    pub fn from_positions(positions: &[Point3], epsilon: f64) -> Self {
        let mut index = Self::new();
        let mut representatives: Vec<(Point3, GroupId)> = Vec::new();
        for (i, p) in positions.iter().enumerate() {
            let id = VertexId::new(i);
            match representatives.iter().find(|(q, _)| approx_eq_3(p, q, epsilon)) {
                Some(&(_, group)) => {
                    index.set_lookup(id, group);
                    index.groups[group].members.push(id);
                }
                None => {
                    let group = index.insert_singleton(id, *p);
                    representatives.push((*p, group));
                }
            }
        }
        index
    }

    /// Number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Iterates over all groups.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &SharedVertexGroup)> {
        self.groups.iter()
    }

    /// Returns the group containing `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not registered.
    pub fn group_of(&self, id: VertexId) -> Result<GroupId> {
        self.lookup
            .get(id.index())
            .copied()
            .flatten()
            .ok_or_else(|| TopologyError::NotFound(format!("shared group of vertex {id}")).into())
    }

    /// Returns a group by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn group(&self, group: GroupId) -> Result<&SharedVertexGroup> {
        self.groups
            .get(group)
            .ok_or_else(|| TopologyError::NotFound("shared vertex group".into()).into())
    }

    /// Returns the canonical position of a group.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn position(&self, group: GroupId) -> Result<Point3> {
        Ok(self.group(group)?.position)
    }

    /// Returns the canonical position of the group containing `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not registered.
    pub fn position_of(&self, id: VertexId) -> Result<Point3> {
        self.position(self.group_of(id)?)
    }

    /// Returns `true` if `a` and `b` belong to the same group.
    #[must_use]
    pub fn are_shared(&self, a: VertexId, b: VertexId) -> bool {
        matches!((self.group_of(a), self.group_of(b)), (Ok(ga), Ok(gb)) if ga == gb)
    }

    /// Moves a group's canonical position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn set_position(&mut self, group: GroupId, position: Point3) -> Result<()> {
        self.groups
            .get_mut(group)
            .ok_or_else(|| TopologyError::NotFound("shared vertex group".into()))?
            .position = position;
        Ok(())
    }

    /// Registers `id` in a new singleton group at `position`.
    ///
    /// If `id` already belonged to a group it is detached from it first.
    pub fn insert_singleton(&mut self, id: VertexId, position: Point3) -> GroupId {
        self.detach(id);
        let group = self.groups.insert(SharedVertexGroup {
            members: vec![id],
            position,
        });
        self.set_lookup(id, group);
        group
    }

    /// Moves `id` into an existing group.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn join(&mut self, id: VertexId, group: GroupId) -> Result<()> {
        if !self.groups.contains_key(group) {
            return Err(TopologyError::NotFound("shared vertex group".into()).into());
        }
        if self.group_of(id).ok() == Some(group) {
            return Ok(());
        }
        self.detach(id);
        self.groups[group].members.push(id);
        self.set_lookup(id, group);
        Ok(())
    }

    /// Unions the groups containing each id into the group of the first id.
    /// Positions are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `ids` is empty or any id is unregistered.
    pub fn union(&mut self, ids: &[VertexId]) -> Result<GroupId> {
        let first = *ids
            .first()
            .ok_or_else(|| TopologyError::NotFound("no vertices to merge".into()))?;
        let target = self.group_of(first)?;
        let sources = ids
            .iter()
            .map(|&id| self.group_of(id))
            .collect::<Result<Vec<_>>>()?;

        for source in sources {
            if source == target {
                continue;
            }
            if let Some(absorbed) = self.groups.remove(source) {
                for &m in &absorbed.members {
                    self.set_lookup(m, target);
                }
                self.groups[target].members.extend(absorbed.members);
            }
        }
        Ok(target)
    }

    /// Unions the groups containing `ids` and moves the surviving group to the
    /// centroid of the ids' prior positions.
    ///
    /// Triangles that collapse because of the merge are left for the caller
    /// to prune.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `ids` is empty or any id is unregistered.
    pub fn merge_groups(&mut self, ids: &[VertexId]) -> Result<GroupId> {
        let prior = ids
            .iter()
            .map(|&id| self.position_of(id))
            .collect::<Result<Vec<_>>>()?;
        let group = self.union(ids)?;
        if let Some(center) = crate::math::polygon_3d::centroid(&prior) {
            self.groups[group].position = center;
        }
        Ok(group)
    }

    /// Welds the groups of `ids` whose canonical positions lie within
    /// `epsilon` of each other, transitively.
    ///
    /// Each connected component is merged and moved to the average of its
    /// members' positions. Component building repeats on the merged
    /// positions until no two resulting groups are within `epsilon`, so
    /// welding an already welded set is a no-op. The price is reach: a
    /// merged group can absorb a point farther than `epsilon` from every one
    /// of its original members. With `epsilon = 1`, `(0, 0)` and `(1, 0)`
    /// weld to `(0.5, 0)`, which then pulls in `(0.5, 0.95)`.
    ///
    /// Returns the groups that absorbed at least one other group.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if any id is unregistered.
    pub fn weld(&mut self, ids: &[VertexId], epsilon: f64) -> Result<Vec<GroupId>> {
        let mut candidates: Vec<GroupId> = Vec::new();
        for &id in ids {
            let g = self.group_of(id)?;
            if !candidates.contains(&g) {
                candidates.push(g);
            }
        }

        let mut welded: Vec<GroupId> = Vec::new();
        loop {
            let components = self.components_within(&candidates, epsilon);
            let merges: Vec<&Vec<GroupId>> = components.iter().filter(|c| c.len() > 1).collect();
            if merges.is_empty() {
                break;
            }

            for component in merges {
                let target = component[0];
                let mut sum = Vector3::zeros();
                let mut count = 0usize;
                for &g in component {
                    let group = &self.groups[g];
                    sum += group.position.coords * group.members.len() as f64;
                    count += group.members.len();
                }
                let representatives: Vec<VertexId> =
                    component.iter().map(|&g| self.groups[g].members[0]).collect();
                self.union(&representatives)?;
                #[allow(clippy::cast_precision_loss)]
                let average = Point3::from(sum / count.max(1) as f64);
                self.groups[target].position = average;
                debug!(groups = component.len(), members = count, "welded shared vertex groups");

                welded.retain(|g| !component.contains(g));
                welded.push(target);
            }
            candidates.retain(|g| self.groups.contains_key(*g));
        }
        Ok(welded)
    }

    /// Places each id into its own singleton group.
    ///
    /// Each split id takes its own stored position from `own_positions`
    /// (indexed by vertex id), so splitting right after a merge restores the
    /// pre-merge positions.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if any id is unregistered or has no stored position.
    pub fn split(&mut self, ids: &[VertexId], own_positions: &[Point3]) -> Result<Vec<GroupId>> {
        for &id in ids {
            self.group_of(id)?;
            if own_positions.get(id.index()).is_none() {
                return Err(TopologyError::NotFound(format!("position of vertex {id}")).into());
            }
        }
        Ok(ids
            .iter()
            .map(|&id| self.insert_singleton(id, own_positions[id.index()]))
            .collect())
    }

    /// Forgets `removed` ids (sorted ascending, unique) and shifts every larger
    /// id down, mirroring a compaction of the vertex arrays.
    pub fn remove_and_shift(&mut self, removed: &[VertexId]) {
        for &id in removed {
            self.detach(id);
        }
        let shift = |id: VertexId| {
            let below = removed.partition_point(|r| r.index() < id.index());
            VertexId::new(id.index() - below)
        };
        for group in self.groups.values_mut() {
            for m in &mut group.members {
                *m = shift(*m);
            }
        }
        let mut lookup = Vec::with_capacity(self.lookup.len().saturating_sub(removed.len()));
        for (i, entry) in self.lookup.iter().enumerate() {
            if removed.binary_search(&VertexId::new(i)).is_err() {
                lookup.push(*entry);
            }
        }
        self.lookup = lookup;
    }

    /// Verifies that forward and reverse lookups agree and that the ids
    /// `0..vertex_count` are partitioned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTopology` describing the first inconsistency found.
    pub fn check_consistency(&self, vertex_count: usize) -> Result<()> {
        if self.lookup.len() != vertex_count {
            return Err(TopologyError::InvalidTopology(format!(
                "shared index covers {} vertices, mesh has {vertex_count}",
                self.lookup.len()
            ))
            .into());
        }
        let mut owner: HashMap<VertexId, GroupId> = HashMap::new();
        for (group_id, group) in &self.groups {
            if group.members.is_empty() {
                return Err(TopologyError::InvalidTopology("empty shared group".into()).into());
            }
            for &m in &group.members {
                if owner.insert(m, group_id).is_some() {
                    return Err(TopologyError::InvalidTopology(format!(
                        "vertex {m} belongs to more than one group"
                    ))
                    .into());
                }
                if self.lookup.get(m.index()).copied().flatten() != Some(group_id) {
                    return Err(TopologyError::InvalidTopology(format!(
                        "reverse lookup of vertex {m} disagrees with its group"
                    ))
                    .into());
                }
            }
        }
        if owner.len() != vertex_count {
            return Err(TopologyError::InvalidTopology(format!(
                "{} of {vertex_count} vertices are grouped",
                owner.len()
            ))
            .into());
        }
        Ok(())
    }

    /// Connected components over `candidates`, linking two groups when their
    /// positions are within `epsilon`. Components keep candidate order.
    fn components_within(&self, candidates: &[GroupId], epsilon: f64) -> Vec<Vec<GroupId>> {
        let n = candidates.len();
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let pi = self.groups[candidates[i]].position;
                let pj = self.groups[candidates[j]].position;
                if (pi - pj).norm() <= epsilon {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    if ri != rj {
                        // Keep the earlier candidate as root so the target group is stable.
                        let (lo, hi) = if ri < rj { (ri, rj) } else { (rj, ri) };
                        parent[hi] = lo;
                    }
                }
            }
        }

        let mut by_root: Vec<Vec<GroupId>> = Vec::new();
        let mut slot: HashMap<usize, usize> = HashMap::new();
        for (i, &g) in candidates.iter().enumerate() {
            let root = find(&mut parent, i);
            let idx = *slot.entry(root).or_insert_with(|| {
                by_root.push(Vec::new());
                by_root.len() - 1
            });
            by_root[idx].push(g);
        }
        by_root
    }

    fn set_lookup(&mut self, id: VertexId, group: GroupId) {
        if self.lookup.len() <= id.index() {
            self.lookup.resize(id.index() + 1, None);
        }
        self.lookup[id.index()] = Some(group);
    }

    fn detach(&mut self, id: VertexId) {
        let Some(group) = self.lookup.get(id.index()).copied().flatten() else {
            return;
        };
        self.lookup[id.index()] = None;
        if let Some(g) = self.groups.get_mut(group) {
            g.members.retain(|&m| m != id);
            if g.members.is_empty() {
                self.groups.remove(group);
            }
        }
    }
}
