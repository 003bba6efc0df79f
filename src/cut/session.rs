use tracing::debug;

use crate::error::Result;
use crate::math::distance_3d::{approx_eq_3, closest_point_on_segment};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::{EditableMesh, FaceId};
use crate::operations::insertion::nearest_boundary_edge;
use crate::operations::query::boundary_loops;

use super::descriptor::{CutVertexDescriptor, VertexKind};
use super::planner::{FaceCutPlanner, ReplacementFaces};
use super::settings::CutSettings;

/// A cut path being placed on one face.
///
/// The session only records classified points; the mesh is not modified
/// until [`CutSession::commit`].
#[derive(Debug, Clone)]
pub struct CutSession {
    face: FaceId,
    settings: CutSettings,
    vertices: Vec<CutVertexDescriptor>,
}

/// Polyline of a pending cut, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CutPreview {
    /// Placed points in order.
    pub polyline: Vec<Point3>,
    /// Segment from the last point back to the first, when the commit would
    /// close the path.
    pub closing: Option<(Point3, Point3)>,
    /// Length of the polyline, without the closing segment.
    pub length: f64,
}

impl CutSession {
    /// Starts an empty cut on `face`.
    #[must_use]
    pub fn begin(face: FaceId) -> Self {
        Self {
            face,
            settings: CutSettings::default(),
            vertices: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: CutSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn face(&self) -> FaceId {
        self.face
    }

    #[must_use]
    pub fn settings(&self) -> &CutSettings {
        &self.settings
    }

    /// Placed points in order.
    #[must_use]
    pub fn vertices(&self) -> &[CutVertexDescriptor] {
        &self.vertices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Classifies and appends a point placed on the face.
    ///
    /// Snapping is tried in order: an earlier path point, a boundary vertex,
    /// then the nearest boundary edge. Returns `None` when the point lands on
    /// the last placed point; the session is then unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist and `InvalidTopology` if
    /// its boundary cannot be walked.
    pub fn add_vertex(
        &mut self,
        mesh: &EditableMesh,
        position: Point3,
        normal: Vector3,
    ) -> Result<Option<CutVertexDescriptor>> {
        let descriptor = self.classify(mesh, position, normal)?;
        if let Some(last) = self.vertices.last() {
            if approx_eq_3(&last.position, &descriptor.position, TOLERANCE) {
                return Ok(None);
            }
        }
        debug!(kind = ?descriptor.kind, index = self.vertices.len(), "placed cut vertex");
        self.vertices.push(descriptor);
        Ok(Some(descriptor))
    }

    fn classify(
        &self,
        mesh: &EditableMesh,
        position: Point3,
        normal: Vector3,
    ) -> Result<CutVertexDescriptor> {
        let face = mesh.face(self.face)?;

        let mut on_path: Option<(f64, &CutVertexDescriptor)> = None;
        for placed in &self.vertices {
            let d = (placed.position - position).norm();
            if d <= self.settings.path_snap_distance && on_path.map_or(true, |(best, _)| d < best)
            {
                on_path = Some((d, placed));
            }
        }
        if let Some((_, placed)) = on_path {
            return Ok(CutVertexDescriptor::new(
                placed.position,
                normal,
                placed.kind | VertexKind::VERTEX_IN_SHAPE,
            ));
        }

        let mut on_vertex: Option<(f64, Point3)> = None;
        for ring in boundary_loops(face.boundary_edges())? {
            for e in ring {
                let p = mesh.position(e.a)?;
                let d = (p - position).norm();
                if d <= self.settings.vertex_snap_distance
                    && on_vertex.map_or(true, |(best, _)| d < best)
                {
                    on_vertex = Some((d, p));
                }
            }
        }
        if let Some((_, p)) = on_vertex {
            return Ok(CutVertexDescriptor::new(p, normal, VertexKind::EXISTING_VERTEX));
        }

        let edge = nearest_boundary_edge(mesh, face, &position)?;
        let (foot, _) = closest_point_on_segment(&position, &mesh.position(edge.a)?, &mesh.position(edge.b)?);
        if (foot - position).norm() <= self.settings.vertex_snap_distance {
            return Ok(CutVertexDescriptor::new(foot, normal, VertexKind::ADDED_ON_EDGE));
        }

        Ok(CutVertexDescriptor::new(position, normal, VertexKind::NEW_VERTEX))
    }

    /// Removes and returns the last placed point.
    pub fn remove_last_vertex(&mut self) -> Option<CutVertexDescriptor> {
        self.vertices.pop()
    }

    /// Whether the path should be committed without further input.
    #[must_use]
    pub fn should_auto_close(&self) -> bool {
        let (Some(first), Some(last)) = (self.vertices.first(), self.vertices.last()) else {
            return false;
        };
        if self.vertices.len() < 2 {
            return false;
        }
        (self.settings.closes_on_click_to_start() && self.is_loop())
            || (self.settings.closes_on_edge_connection()
                && first.kind.touches_boundary()
                && last.kind.touches_boundary())
    }

    /// Whether the last point was snapped back onto the first.
    #[must_use]
    pub fn is_loop(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) if self.vertices.len() > 1 => {
                last.kind.contains(VertexKind::VERTEX_IN_SHAPE)
                    && approx_eq_3(&first.position, &last.position, TOLERANCE)
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn preview(&self) -> CutPreview {
        let polyline: Vec<Point3> = self.vertices.iter().map(|v| v.position).collect();
        let length = polyline.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        let closing = match (polyline.first(), polyline.last()) {
            (Some(&first), Some(&last))
                if self.settings.connect_to_start && polyline.len() > 2 && !self.is_loop() =>
            {
                Some((last, first))
            }
            _ => None,
        };
        CutPreview {
            polyline,
            closing,
            length,
        }
    }

    /// Commits the path to `mesh`.
    ///
    /// # Errors
    ///
    /// See [`FaceCutPlanner::execute`]. On error neither the mesh nor the
    /// session changes.
    pub fn commit(&self, mesh: &mut EditableMesh) -> Result<ReplacementFaces> {
        FaceCutPlanner::new(self.face, self.vertices.clone())
            .with_settings(self.settings)
            .execute(mesh)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cut::ClosePolicy;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn square() -> (EditableMesh, FaceId) {
        let positions = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let mesh = EditableMesh::from_polygons(&positions, &[vec![0, 1, 2, 3]]).unwrap();
        let face = mesh.face_ids()[0];
        (mesh, face)
    }

    fn add(session: &mut CutSession, mesh: &EditableMesh, x: f64, y: f64) -> Option<CutVertexDescriptor> {
        session.add_vertex(mesh, p(x, y), Vector3::z()).unwrap()
    }

    #[test]
    fn classifies_by_proximity() {
        let (mesh, face) = square();
        let mut session = CutSession::begin(face);

        let corner = add(&mut session, &mesh, 0.05, 0.02).unwrap();
        assert_eq!(corner.kind, VertexKind::EXISTING_VERTEX);
        assert_relative_eq!(corner.position, p(0.0, 0.0));

        let edge = add(&mut session, &mesh, 0.5, 0.04).unwrap();
        assert_eq!(edge.kind, VertexKind::ADDED_ON_EDGE);
        assert_relative_eq!(edge.position, p(0.5, 0.0));

        let free = add(&mut session, &mesh, 0.5, 0.5).unwrap();
        assert_eq!(free.kind, VertexKind::NEW_VERTEX);

        let back = add(&mut session, &mesh, 0.03, 0.03).unwrap();
        assert_eq!(back.kind, VertexKind::EXISTING_VERTEX | VertexKind::VERTEX_IN_SHAPE);
        assert!(session.is_loop());
    }

    #[test]
    fn repeated_last_point_is_ignored() {
        let (mesh, face) = square();
        let mut session = CutSession::begin(face);
        add(&mut session, &mesh, 0.5, 0.5).unwrap();
        assert!(add(&mut session, &mesh, 0.52, 0.5).is_none());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn auto_close_follows_policy() {
        let (mesh, face) = square();
        let mut session = CutSession::begin(face)
            .with_settings(CutSettings::default().with_close_policy(ClosePolicy::EdgeConnection));
        add(&mut session, &mesh, 0.5, 0.0);
        assert!(!session.should_auto_close());
        add(&mut session, &mesh, 0.5, 0.5);
        add(&mut session, &mesh, 0.5, 1.0);
        assert!(session.should_auto_close());

        let mut manual = CutSession::begin(face)
            .with_settings(CutSettings::default().with_close_policy(ClosePolicy::Manual));
        add(&mut manual, &mesh, 0.5, 0.0);
        add(&mut manual, &mesh, 0.5, 1.0);
        assert!(!manual.should_auto_close());
    }

    #[test]
    fn click_to_start_closes_loop() {
        let (mesh, face) = square();
        let mut session = CutSession::begin(face)
            .with_settings(CutSettings::default().with_close_policy(ClosePolicy::ClickToStart));
        add(&mut session, &mesh, 0.3, 0.3);
        add(&mut session, &mesh, 0.7, 0.3);
        add(&mut session, &mesh, 0.5, 0.7);
        assert!(!session.should_auto_close());
        add(&mut session, &mesh, 0.31, 0.29);
        assert!(session.should_auto_close());
    }

    #[test]
    fn preview_shows_closing_segment() {
        let (mesh, face) = square();
        let mut session = CutSession::begin(face);
        add(&mut session, &mesh, 0.3, 0.3);
        add(&mut session, &mesh, 0.7, 0.3);
        assert!(session.preview().closing.is_none());
        add(&mut session, &mesh, 0.7, 0.7);

        let preview = session.preview();
        assert_eq!(preview.polyline.len(), 3);
        assert_relative_eq!(preview.length, 0.8, epsilon = 1e-12);
        assert_eq!(preview.closing, Some((p(0.7, 0.7), p(0.3, 0.3))));
    }

    #[test]
    fn remove_last_vertex_pops() {
        let (mesh, face) = square();
        let mut session = CutSession::begin(face);
        add(&mut session, &mesh, 0.3, 0.3);
        add(&mut session, &mesh, 0.7, 0.3);
        let removed = session.remove_last_vertex().unwrap();
        assert_relative_eq!(removed.position, p(0.7, 0.3));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn failed_commit_keeps_session_and_mesh() {
        let (mut mesh, face) = square();
        let mut session = CutSession::begin(face);
        add(&mut session, &mesh, 0.3, 0.3);
        add(&mut session, &mesh, 0.6, 0.6);
        assert!(session.commit(&mut mesh).unwrap_err().is_failure());
        assert_eq!(session.len(), 2);
        assert_eq!(mesh.face_ids(), vec![face]);
    }
}
