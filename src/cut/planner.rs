use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{CutError, MeshEditError, Result};
use crate::math::distance_3d::approx_eq_3;
use crate::math::polygon_3d::{
    centroid, point_in_polygon_2d, point_in_triangle_2d, signed_area_2d, triangle_normal,
};
use crate::math::projection::ProjectionAxis;
use crate::math::{Point2, Point3, Vector3, TOLERANCE};
use crate::mesh::{EditableMesh, Edge, Face, FaceId, GroupId, MaterialId, VertexId};
use crate::operations::query::{face_normal, sorted_boundary};
use crate::operations::{CreatePolygon, InsertDetachedVertex, InsertOnEdge, InsertOnExistingVertex};

use super::descriptor::{CutVertexDescriptor, VertexKind};
use super::settings::CutSettings;
use super::transaction::MeshTransaction;

/// Shape of a committed cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// Closed path inside the face: one face with an inner ring.
    Hole,
    /// Path touching the boundary once: the closed loop plus the remainder.
    Bisection,
    /// Path touching the boundary two or more times.
    MultiSplit,
}

/// Faces produced by a committed cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementFaces {
    /// How the face was cut.
    pub kind: CutKind,
    /// The faces that replaced the target face.
    pub faces: Vec<FaceId>,
    /// Vertex ids of the cut path, in path order.
    pub cut_vertices: Vec<VertexId>,
}

/// Decomposes a face along a cut path into replacement faces.
///
/// Cut points are inserted into a copy of the mesh, the copy's target face
/// is split into polygons, and the copy replaces the mesh only when every
/// polygon triangulated. On error the mesh is untouched.
pub struct FaceCutPlanner {
    face: FaceId,
    path: Vec<CutVertexDescriptor>,
    settings: CutSettings,
}

impl FaceCutPlanner {
    /// Creates a new `FaceCutPlanner`.
    #[must_use]
    pub fn new(face: FaceId, path: Vec<CutVertexDescriptor>) -> Self {
        Self {
            face,
            path,
            settings: CutSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: CutSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Commits the cut.
    ///
    /// # Errors
    ///
    /// Returns `NoSelection` if the path has fewer than 2 points or the face
    /// does not exist, `NotFound` if a point does not match its declared
    /// kind, and `Failure` if the cut shape cannot be decomposed or a
    /// resulting polygon cannot be triangulated.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<ReplacementFaces> {
        if self.path.len() < 2 || mesh.face(self.face).is_err() {
            return Err(CutError::NoSelection.into());
        }

        let mut scratch = mesh.clone();
        let (target, ids) = self.insert_path(&mut scratch)?;
        let ctx = FaceContext::new(&scratch, target)?;
        let mut cut = ctx.resolve_path(&ids)?;

        let boundary_groups: HashSet<GroupId> = cut
            .groups
            .iter()
            .copied()
            .filter(|g| ctx.boundary_groups.contains(g))
            .collect();
        let kind = match boundary_groups.len() {
            0 => CutKind::Hole,
            1 => CutKind::Bisection,
            _ => CutKind::MultiSplit,
        };
        if kind == CutKind::MultiSplit && !cut.is_loop {
            let trimmed = cut.trim_dangling_ends(&ctx.boundary_groups);
            if trimmed > 0 {
                debug!(trimmed, "dropped cut path ends that do not reach the boundary");
            }
        }
        debug!(
            ?kind,
            points = cut.ids.len(),
            touches = boundary_groups.len(),
            closed = cut.is_loop,
            "classified cut"
        );

        let mut tx = MeshTransaction::new();
        match kind {
            CutKind::Hole => ctx.plan_hole(&cut, &self.settings, &mut tx),
            CutKind::Bisection => ctx.plan_bisection(&cut, &self.settings, &mut tx),
            CutKind::MultiSplit => ctx.plan_multi_split(&cut, &mut tx),
        }
        .map_err(into_cut_failure)?;
        tx.delete_face(target);
        let faces = tx.commit(&mut scratch).map_err(into_cut_failure)?;

        *mesh = scratch;
        debug!(faces = faces.len(), "committed cut");
        Ok(ReplacementFaces {
            kind,
            faces,
            cut_vertices: cut.ids,
        })
    }

    /// Resolves every path point to a vertex id in `mesh`, inserting edge and
    /// free points. Edge insertions replace the target face, so the current
    /// target is returned alongside the ids.
    fn insert_path(&self, mesh: &mut EditableMesh) -> Result<(FaceId, Vec<VertexId>)> {
        let eps = self.settings.weld_epsilon;
        let mut target = self.face;
        let mut ids: Vec<VertexId> = Vec::with_capacity(self.path.len());

        for (i, point) in self.path.iter().enumerate() {
            let earlier = point
                .kind
                .contains(VertexKind::VERTEX_IN_SHAPE)
                .then(|| {
                    self.path[..i]
                        .iter()
                        .position(|p| approx_eq_3(&p.position, &point.position, eps))
                })
                .flatten();

            let id = if let Some(j) = earlier {
                ids[j]
            } else if point.kind.contains(VertexKind::EXISTING_VERTEX) {
                InsertOnExistingVertex::new(point.position)
                    .with_epsilon(eps)
                    .in_face(target)
                    .execute(mesh)?
            } else if point.kind.contains(VertexKind::ADDED_ON_EDGE) {
                match face_vertex_at(mesh, target, &point.position, eps)? {
                    Some(existing) => existing,
                    None => {
                        let inserted = InsertOnEdge::new(target, point.position).execute(mesh)?;
                        target = inserted.face;
                        inserted.vertex
                    }
                }
            } else {
                InsertDetachedVertex::new(target, point.position)
                    .with_normal(point.normal)
                    .execute(mesh)?
            };
            ids.push(id);
        }
        Ok((target, ids))
    }
}

/// Planning failures surface as commit failures; lookup errors stay as they are.
fn into_cut_failure(err: MeshEditError) -> MeshEditError {
    match err {
        MeshEditError::Geometry(_) | MeshEditError::Tessellation(_) => {
            CutError::Failure(err.to_string()).into()
        }
        other => other,
    }
}

fn face_vertex_at(
    mesh: &EditableMesh,
    face: FaceId,
    position: &Point3,
    eps: f64,
) -> Result<Option<VertexId>> {
    for &v in mesh.face(face)?.distinct_indices() {
        if approx_eq_3(&mesh.position(v)?, position, eps) {
            return Ok(Some(v));
        }
    }
    Ok(None)
}

fn failure(reason: &str) -> MeshEditError {
    CutError::Failure(reason.into()).into()
}

/// A cut path after insertion, in face-local ids with consecutive
/// duplicates collapsed.
struct CutPath {
    ids: Vec<VertexId>,
    groups: Vec<GroupId>,
    is_loop: bool,
}

impl CutPath {
    fn distinct_groups(&self) -> usize {
        self.groups.iter().collect::<HashSet<_>>().len()
    }

    /// Drops points before the first and after the last boundary touch.
    /// Returns the number of points removed.
    fn trim_dangling_ends(&mut self, boundary: &HashSet<GroupId>) -> usize {
        let first = self.groups.iter().position(|g| boundary.contains(g));
        let last = self.groups.iter().rposition(|g| boundary.contains(g));
        let (Some(first), Some(last)) = (first, last) else {
            return 0;
        };
        let before = self.ids.len();
        self.ids.truncate(last + 1);
        self.groups.truncate(last + 1);
        self.ids.drain(..first);
        self.groups.drain(..first);
        before - self.ids.len()
    }

    /// Index after `i` walking forward or backward; wraps only on loops.
    fn step(&self, i: usize, forward: bool) -> Option<usize> {
        let m = self.ids.len();
        match (forward, self.is_loop) {
            (true, _) if i + 1 < m => Some(i + 1),
            (true, true) => Some(0),
            (false, _) if i > 0 => Some(i - 1),
            (false, true) => Some(m - 1),
            _ => None,
        }
    }

    /// Ids visited walking from index `i` until a point in `goal` is reached,
    /// ending with that point. `None` if the walk runs off an end of the path
    /// first.
    fn walk_to(&self, mut i: usize, forward: bool, goal: GroupId) -> Option<Vec<VertexId>> {
        let mut visited = Vec::new();
        for _ in 0..self.ids.len() {
            i = self.step(i, forward)?;
            visited.push(self.ids[i]);
            if self.groups[i] == goal {
                return Some(visited);
            }
        }
        None
    }
}

/// The target face as seen by the planner.
struct FaceContext<'m> {
    mesh: &'m EditableMesh,
    face: &'m Face,
    ring: Vec<Edge>,
    boundary_groups: HashSet<GroupId>,
    normal: Vector3,
    axis: ProjectionAxis,
    material: MaterialId,
    manual_uv: bool,
}

impl<'m> FaceContext<'m> {
    fn new(mesh: &'m EditableMesh, target: FaceId) -> Result<Self> {
        let face = mesh.face(target)?;
        let ring = sorted_boundary(face)?;
        let boundary_groups = ring
            .iter()
            .map(|e| mesh.group_of(e.a))
            .collect::<Result<HashSet<_>>>()?;
        let normal = face_normal(mesh, face)?;
        Ok(Self {
            mesh,
            face,
            ring,
            boundary_groups,
            normal,
            axis: ProjectionAxis::from_normal(&normal),
            material: face.material,
            manual_uv: face.manual_uv,
        })
    }

    fn group(&self, v: VertexId) -> Result<GroupId> {
        self.mesh.group_of(v)
    }

    fn position(&self, v: VertexId) -> Result<Point3> {
        self.mesh.position(v)
    }

    fn project(&self, ids: &[VertexId]) -> Result<Vec<Point2>> {
        ids.iter()
            .map(|&v| Ok(self.axis.project(&self.position(v)?)))
            .collect()
    }

    /// Positive when `ids` wind counter-clockwise around the face normal.
    fn orientation(&self, ids: &[VertexId]) -> Result<f64> {
        let sign = self.axis.vector().dot(&self.normal).signum();
        Ok(signed_area_2d(&self.project(ids)?) * sign)
    }

    fn polygon(&self, outer: Vec<VertexId>) -> CreatePolygon {
        CreatePolygon::new(outer)
            .with_normal(self.normal)
            .with_material(self.material)
            .with_manual_uv(self.manual_uv)
    }

    /// Maps ids onto members of the target face where their group has one,
    /// collapses consecutive repeats and detects a closed path.
    fn resolve_path(&self, ids: &[VertexId]) -> Result<CutPath> {
        let mut local: Vec<VertexId> = Vec::with_capacity(ids.len());
        let mut groups: Vec<GroupId> = Vec::with_capacity(ids.len());
        for &v in ids {
            let g = self.group(v)?;
            if groups.last() == Some(&g) {
                continue;
            }
            let member = if self.face.contains(v) {
                v
            } else {
                self.mesh
                    .shared()
                    .group(g)?
                    .members()
                    .iter()
                    .copied()
                    .find(|&m| self.face.contains(m))
                    .unwrap_or(v)
            };
            local.push(member);
            groups.push(g);
        }

        let mut is_loop = false;
        if local.len() > 1 && groups.first() == groups.last() {
            local.pop();
            groups.pop();
            is_loop = true;
        }
        if local.len() < 2 {
            return Err(failure("cut path collapses to a single point"));
        }
        Ok(CutPath {
            ids: local,
            groups,
            is_loop,
        })
    }

    fn outer_ids(&self) -> Vec<VertexId> {
        self.ring.iter().map(|e| e.a).collect()
    }

    fn plan_hole(&self, cut: &CutPath, settings: &CutSettings, tx: &mut MeshTransaction) -> Result<()> {
        if cut.distinct_groups() < 3 {
            return Err(failure("a hole needs at least 3 distinct points"));
        }
        let outer = self.outer_ids();
        let outer_2d = self.project(&outer)?;
        for p in self.project(&cut.ids)? {
            if !point_in_polygon_2d(&p, &outer_2d) {
                return Err(failure("hole extends past the face boundary"));
            }
        }

        tx.add_polygon(self.polygon(outer).with_holes(vec![cut.ids.clone()]));
        if settings.fill_hole {
            tx.add_polygon(self.polygon(cut.ids.clone()));
        }
        Ok(())
    }

    fn plan_bisection(
        &self,
        cut: &CutPath,
        settings: &CutSettings,
        tx: &mut MeshTransaction,
    ) -> Result<()> {
        if !cut.is_loop && !settings.connect_to_start {
            return Err(failure(
                "path touches the boundary once and is not closed",
            ));
        }
        if cut.distinct_groups() < 3 {
            return Err(failure("a bisection loop needs at least 3 distinct points"));
        }

        let touch = cut
            .groups
            .iter()
            .position(|g| self.boundary_groups.contains(g))
            .ok_or_else(|| failure("bisection does not touch the boundary"))?;
        let mut cut_loop = cut.ids[touch..].to_vec();
        cut_loop.extend_from_slice(&cut.ids[..touch]);
        let anchor = cut_loop[0];
        let anchor_group = self.group(anchor)?;

        // Remainder: full boundary from the anchor, back through the anchor,
        // then around the loop against the face's winding.
        let n = self.ring.len();
        let start = self
            .ring
            .iter()
            .position(|e| self.group(e.a).ok() == Some(anchor_group))
            .ok_or_else(|| failure("bisection anchor is not on the boundary"))?;
        let mut remainder: Vec<VertexId> = (0..n).map(|i| self.ring[(start + i) % n].a).collect();
        remainder.push(anchor);
        let mut tail = cut_loop[1..].to_vec();
        if self.orientation(&cut_loop)? > 0.0 {
            tail.reverse();
        }
        remainder.extend(tail);

        let second = self.single_duplicate(&remainder)?;
        let len = remainder.len();
        let complement = [
            remainder[(second + len - 1) % len],
            remainder[second],
            remainder[(second + 1) % len],
        ];
        let polygon = self.polygon(remainder);
        let face = polygon.prepare(self.mesh)?;
        let repair: Vec<[VertexId; 3]> = self
            .uncovered_triangle(&face, complement, &cut_loop)?
            .into_iter()
            .collect();
        tx.add_polygon(polygon.with_extra_triangles(repair));

        let mut inner = cut_loop;
        if self.orientation(&inner)? < 0.0 {
            inner.reverse();
        }
        tx.add_polygon(self.polygon(inner));
        Ok(())
    }

    /// Index of the second occurrence of the one group repeated in `ids`.
    /// `Failure` when no group or more than one group repeats.
    fn single_duplicate(&self, ids: &[VertexId]) -> Result<usize> {
        match self.duplicated_positions(ids)?.as_slice() {
            [(_, second)] => Ok(*second),
            _ => Err(failure(
                "bisection remainder must repeat exactly one boundary vertex",
            )),
        }
    }

    /// Index pairs of groups occurring twice in `ids`; `Failure` for any
    /// group occurring more often.
    fn duplicated_positions(&self, ids: &[VertexId]) -> Result<Vec<(usize, usize)>> {
        let mut seen: HashMap<GroupId, Vec<usize>> = HashMap::new();
        for (i, &v) in ids.iter().enumerate() {
            seen.entry(self.group(v)?).or_default().push(i);
        }
        let mut pairs = Vec::new();
        for positions in seen.into_values() {
            match positions.as_slice() {
                [_] => {}
                [a, b] => pairs.push((*a, *b)),
                _ => return Err(failure("vertex repeats more than twice in cut polygon")),
            }
        }
        pairs.sort_unstable();
        Ok(pairs)
    }

    /// The complementary triangle around a duplicated vertex, when it has
    /// area, lies inside the face and outside the cut loop, and the
    /// triangulation does not already cover it. Wound along the face normal.
    fn uncovered_triangle(
        &self,
        face: &Face,
        [a, b, c]: [VertexId; 3],
        cut_loop: &[VertexId],
    ) -> Result<Option<[VertexId; 3]>> {
        let (pa, pb, pc) = (self.position(a)?, self.position(b)?, self.position(c)?);
        let n = triangle_normal(&pa, &pb, &pc);
        if n.norm() < TOLERANCE {
            return Ok(None);
        }
        let Some(center) = centroid(&[pa, pb, pc]) else {
            return Ok(None);
        };
        let q = self.axis.project(&center);
        if !point_in_polygon_2d(&q, &self.project(&self.outer_ids())?)
            || point_in_polygon_2d(&q, &self.project(cut_loop)?)
        {
            return Ok(None);
        }
        for &[x, y, z] in face.triangles() {
            let [px, py, pz] = [x, y, z].map(|v| self.position(v).map(|p| self.axis.project(&p)));
            if point_in_triangle_2d(&q, &px?, &py?, &pz?) {
                return Ok(None);
            }
        }
        Ok(Some(if n.dot(&self.normal) >= 0.0 { [a, b, c] } else { [a, c, b] }))
    }

    fn plan_multi_split(&self, cut: &CutPath, tx: &mut MeshTransaction) -> Result<()> {
        let cut_groups: HashSet<GroupId> = cut.groups.iter().copied().collect();
        let in_cut = |v: VertexId| self.group(v).map(|g| cut_groups.contains(&g));

        let n = self.ring.len();
        let mut start = None;
        for (i, e) in self.ring.iter().enumerate() {
            if in_cut(e.a)? {
                start = Some(i);
                break;
            }
        }
        let start = start.ok_or_else(|| failure("cut does not touch the face boundary"))?;

        let mut polygons: Vec<Vec<VertexId>> = Vec::new();
        let mut current: Vec<VertexId> = Vec::new();
        for step in 0..=n {
            let edge = self.ring[(start + step) % n];
            current.push(edge.a);
            if current.len() > 1 && in_cut(edge.a)? {
                let previous = self.ring[(start + step + n - 1) % n];
                let closure = self.close_along_cut(cut, previous, edge.a, current[0])?;
                current.extend(closure);
                if current.len() > 1 && self.group(current[current.len() - 1])? == self.group(current[0])? {
                    current.pop();
                }
                polygons.push(std::mem::replace(&mut current, vec![edge.a]));
            }
        }

        let mut emitted = 0usize;
        if cut.is_loop && cut.distinct_groups() >= 3 {
            let mut inner = cut.ids.clone();
            if self.orientation(&inner)? < 0.0 {
                inner.reverse();
            }
            tx.add_polygon(self.polygon(inner));
            emitted += 1;
        }
        for polygon in polygons {
            let distinct = polygon
                .iter()
                .map(|&v| self.group(v))
                .collect::<Result<HashSet<_>>>()?;
            if distinct.len() < 3 {
                continue;
            }
            tx.add_polygon(self.polygon(polygon));
            emitted += 1;
        }
        if emitted == 0 {
            return Err(failure("cut produced no polygons"));
        }
        Ok(())
    }

    /// Cut vertices leading from `at` back to `goal`, ending with `goal`.
    ///
    /// Among the path neighbours of every occurrence of `at` from which the
    /// path leads back to `goal`, the one whose direction is most opposed to
    /// the boundary edge just walked wins. Ties go to the earlier candidate
    /// (lower path index first, previous before next).
    fn close_along_cut(
        &self,
        cut: &CutPath,
        previous: Edge,
        at: VertexId,
        goal: VertexId,
    ) -> Result<Vec<VertexId>> {
        let at_group = self.group(at)?;
        let goal_group = self.group(goal)?;
        let at_position = self.position(at)?;
        let walked = (self.position(previous.b)? - self.position(previous.a)?)
            .try_normalize(TOLERANCE)
            .unwrap_or_else(Vector3::zeros);

        let mut best: Option<(f64, Vec<VertexId>)> = None;
        for (i, g) in cut.groups.iter().enumerate() {
            if *g != at_group {
                continue;
            }
            for forward in [false, true] {
                let Some(j) = cut.step(i, forward) else {
                    continue;
                };
                let Some(closure) = cut.walk_to(i, forward, goal_group) else {
                    continue;
                };
                let direction = (self.position(cut.ids[j])? - at_position)
                    .try_normalize(TOLERANCE)
                    .unwrap_or_else(Vector3::zeros);
                let dot = walked.dot(&direction);
                if best.as_ref().map_or(true, |(d, _)| dot < *d) {
                    best = Some((dot, closure));
                }
            }
        }
        best.map(|(_, closure)| closure)
            .ok_or_else(|| failure("cut path never returns to the polygon start"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn square() -> (EditableMesh, FaceId) {
        let positions = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let mesh = EditableMesh::from_polygons(&positions, &[vec![0, 1, 2, 3]]).unwrap();
        let face = mesh.face_ids()[0];
        (mesh, face)
    }

    fn point(x: f64, y: f64, kind: VertexKind) -> CutVertexDescriptor {
        CutVertexDescriptor::new(p(x, y), Vector3::z(), kind)
    }

    fn area(mesh: &EditableMesh, faces: &[FaceId]) -> f64 {
        faces
            .iter()
            .flat_map(|&f| mesh.face(f).unwrap().triangles().to_vec())
            .map(|[a, b, c]| {
                let [pa, pb, pc] = [a, b, c].map(|v| mesh.position(v).unwrap());
                triangle_normal(&pa, &pb, &pc).z / 2.0
            })
            .sum()
    }

    fn corner(mesh: &EditableMesh, face: FaceId, x: f64, y: f64) -> VertexId {
        face_vertex_at(mesh, face, &p(x, y), 1e-9).unwrap().unwrap()
    }

    fn free(mesh: &mut EditableMesh, x: f64, y: f64) -> VertexId {
        mesh.add_vertex(crate::mesh::Vertex::new(p(x, y)))
    }

    fn cut_path(mesh: &EditableMesh, ids: Vec<VertexId>, is_loop: bool) -> CutPath {
        let groups = ids.iter().map(|&v| mesh.group_of(v).unwrap()).collect();
        CutPath {
            ids,
            groups,
            is_loop,
        }
    }

    #[test]
    fn single_point_is_no_selection() {
        let (mut mesh, face) = square();
        let err = FaceCutPlanner::new(face, vec![point(0.5, 0.5, VertexKind::NEW_VERTEX)])
            .execute(&mut mesh)
            .unwrap_err();
        assert!(err.is_no_selection());
    }

    #[test]
    fn open_interior_segment_fails_without_change() {
        let (mut mesh, face) = square();
        let path = vec![
            point(0.3, 0.3, VertexKind::NEW_VERTEX),
            point(0.6, 0.6, VertexKind::NEW_VERTEX),
        ];
        let err = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap_err();
        assert!(err.is_failure());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_ids(), vec![face]);
    }

    #[test]
    fn bisection_from_corner_emits_loop_and_remainder() {
        let (mut mesh, face) = square();
        let path = vec![
            point(0.0, 0.0, VertexKind::EXISTING_VERTEX),
            point(0.5, 0.2, VertexKind::NEW_VERTEX),
            point(0.2, 0.5, VertexKind::NEW_VERTEX),
        ];
        let result = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap();
        assert_eq!(result.kind, CutKind::Bisection);
        assert_eq!(result.faces.len(), 2);

        let total = area(&mesh, &result.faces);
        assert!((total - 1.0).abs() < 1e-9, "area {total}");
    }

    #[test]
    fn bisection_without_closing_fails() {
        let (mut mesh, face) = square();
        let path = vec![
            point(0.0, 0.0, VertexKind::EXISTING_VERTEX),
            point(0.5, 0.2, VertexKind::NEW_VERTEX),
            point(0.2, 0.5, VertexKind::NEW_VERTEX),
        ];
        let settings = CutSettings::default().with_connect_to_start(false);
        let err = FaceCutPlanner::new(face, path)
            .with_settings(settings)
            .execute(&mut mesh)
            .unwrap_err();
        assert!(err.is_failure());
        assert_eq!(mesh.face_ids(), vec![face]);
    }

    #[test]
    fn existing_vertex_without_match_is_not_found() {
        let (mut mesh, face) = square();
        let path = vec![
            point(0.4, 0.4, VertexKind::EXISTING_VERTEX),
            point(1.0, 1.0, VertexKind::EXISTING_VERTEX),
        ];
        let err = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn diagonal_between_corners_splits_in_two() {
        let (mut mesh, face) = square();
        let path = vec![
            point(0.0, 0.0, VertexKind::EXISTING_VERTEX),
            point(1.0, 1.0, VertexKind::EXISTING_VERTEX),
        ];
        let result = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap();
        assert_eq!(result.kind, CutKind::MultiSplit);
        assert_eq!(result.faces.len(), 2);
        for &f in &result.faces {
            assert_eq!(mesh.face(f).unwrap().distinct_indices().len(), 3);
        }
    }

    #[test]
    fn hole_past_the_boundary_fails() {
        let (mut mesh, face) = square();
        let path = vec![
            point(0.2, 0.2, VertexKind::NEW_VERTEX),
            point(1.5, 0.5, VertexKind::NEW_VERTEX),
            point(0.2, 0.8, VertexKind::NEW_VERTEX),
        ];
        let err = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap_err();
        assert!(err.is_failure());
        assert_eq!(mesh.face_ids(), vec![face]);
    }

    #[test]
    fn remainder_must_repeat_exactly_one_vertex() {
        let (mesh, face) = square();
        let [c0, c1, c2, c3] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .map(|(x, y)| corner(&mesh, face, x, y));
        let ctx = FaceContext::new(&mesh, face).unwrap();

        assert_eq!(ctx.single_duplicate(&[c0, c1, c0, c2]).unwrap(), 2);
        assert!(ctx.single_duplicate(&[c0, c1, c2, c3]).unwrap_err().is_failure());
        assert!(ctx.single_duplicate(&[c0, c1, c0, c1]).unwrap_err().is_failure());
        assert!(ctx.single_duplicate(&[c0, c1, c0, c2, c0]).unwrap_err().is_failure());
    }

    #[test]
    fn equal_turns_prefer_previous_neighbour() {
        let (mut mesh, face) = square();
        let (c0, c1) = (corner(&mesh, face, 0.0, 0.0), corner(&mesh, face, 1.0, 0.0));
        let a = free(&mut mesh, 0.5, 0.5);
        let g = free(&mut mesh, 0.2, 0.9);
        let b = free(&mut mesh, 0.5, -0.5);
        let cut = cut_path(&mesh, vec![c1, a, g, b], true);
        let ctx = FaceContext::new(&mesh, face).unwrap();

        let closure = ctx.close_along_cut(&cut, Edge::new(c0, c1), c1, g).unwrap();
        assert_eq!(closure, vec![b, g]);
    }

    #[test]
    fn revisited_vertex_takes_most_opposed_branch() {
        let (mut mesh, face) = square();
        let (c0, c1) = (corner(&mesh, face, 0.0, 0.0), corner(&mesh, face, 1.0, 0.0));
        let g = free(&mut mesh, 0.5, 0.5);
        let up = free(&mut mesh, 1.0, 0.5);
        let back = free(&mut mesh, 0.2, 0.0);
        let cut = cut_path(&mesh, vec![g, c1, up, c1, back], true);
        let ctx = FaceContext::new(&mesh, face).unwrap();

        let closure = ctx.close_along_cut(&cut, Edge::new(c0, c1), c1, g).unwrap();
        assert_eq!(closure, vec![back, g]);
    }

    #[test]
    fn dead_end_branch_is_skipped() {
        let (mut mesh, face) = square();
        let (c0, c1) = (corner(&mesh, face, 0.0, 0.0), corner(&mesh, face, 1.0, 0.0));
        let g = free(&mut mesh, 0.5, 0.5);
        let stray = free(&mut mesh, 0.2, 0.0);
        let cut = cut_path(&mesh, vec![g, c1, stray], false);
        let ctx = FaceContext::new(&mesh, face).unwrap();

        let closure = ctx.close_along_cut(&cut, Edge::new(c0, c1), c1, g).unwrap();
        assert_eq!(closure, vec![g]);
    }

    #[test]
    fn stray_start_point_is_dropped() {
        let (mut mesh, face) = square();
        let path = vec![
            point(0.6, 0.2, VertexKind::NEW_VERTEX),
            point(0.0, 0.0, VertexKind::EXISTING_VERTEX),
            point(1.0, 1.0, VertexKind::EXISTING_VERTEX),
        ];
        let result = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap();
        assert_eq!(result.kind, CutKind::MultiSplit);
        assert_eq!(result.faces.len(), 2);
        assert!((area(&mesh, &result.faces) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stray_end_point_is_dropped() {
        let (mut mesh, face) = square();
        let path = vec![
            point(0.0, 0.0, VertexKind::EXISTING_VERTEX),
            point(1.0, 1.0, VertexKind::EXISTING_VERTEX),
            point(0.6, 0.2, VertexKind::NEW_VERTEX),
        ];
        let result = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap();
        assert_eq!(result.faces.len(), 2);
        assert!((area(&mesh, &result.faces) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn closed_loop_across_two_edges_keeps_its_inside() {
        let (mut mesh, face) = square();
        let path = vec![
            point(0.5, 0.0, VertexKind::ADDED_ON_EDGE),
            point(0.7, 0.5, VertexKind::NEW_VERTEX),
            point(0.5, 1.0, VertexKind::ADDED_ON_EDGE),
            point(0.3, 0.5, VertexKind::NEW_VERTEX),
            point(0.5, 0.0, VertexKind::ADDED_ON_EDGE | VertexKind::VERTEX_IN_SHAPE),
        ];
        let result = FaceCutPlanner::new(face, path).execute(&mut mesh).unwrap();
        assert_eq!(result.kind, CutKind::MultiSplit);
        assert_eq!(result.faces.len(), 3);
        assert!((area(&mesh, &result.faces) - 1.0).abs() < 1e-9);
    }
}
