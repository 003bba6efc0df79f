use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::Result;
use crate::math::projection::ProjectionAxis;
use crate::math::{Color, Point2, Point3};
use crate::mesh::face::perimeter_edges;
use crate::mesh::{EditableMesh, Face, FaceId, Vertex, VertexId};
use crate::operations::query::{boundary_loops, face_normal};
use crate::tessellation::triangulate;

/// Re-triangulates a face with additional points.
///
/// The face's boundary loops stay constrained; its interior vertices and the
/// new points become free triangulation corners. Existing vertex ids are
/// kept, each new point gets a fresh vertex in its own shared group.
pub struct AppendPoints {
    face: FaceId,
    points: Vec<Point3>,
    colors: Vec<Color>,
}

/// Result of [`AppendPoints`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedPoints {
    /// The face that replaced the original one.
    pub face: FaceId,
    /// New vertex ids, in the order the points were given.
    pub vertices: Vec<VertexId>,
}

impl AppendPoints {
    /// Creates a new `AppendPoints` operation.
    #[must_use]
    pub fn new(face: FaceId, points: Vec<Point3>) -> Self {
        Self {
            face,
            points,
            colors: Vec::new(),
        }
    }

    /// Per-point colors. Points without a color take the face's average.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    /// Executes the re-triangulation.
    ///
    /// UVs of new points are the average of their two neighbours along the
    /// new boundary. A point without exactly two such neighbours switches the
    /// face to automatic UVs.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist, `Degenerate` if it has
    /// no area, `InvalidTopology` if its boundary is not closed, and
    /// `TriangulationFailure` if the point set cannot be triangulated.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<AppendedPoints> {
        let face = mesh.face(self.face)?;
        let normal = face_normal(mesh, face)?;
        let existing = face.distinct_indices().to_vec();
        let local: HashMap<VertexId, usize> =
            existing.iter().enumerate().map(|(i, &v)| (v, i)).collect();

        let rings: Vec<Vec<usize>> = boundary_loops(face.boundary_edges())?
            .into_iter()
            .map(|ring| ring.iter().map(|e| local[&e.a]).collect())
            .collect();
        let on_ring: HashSet<usize> = rings.iter().flatten().copied().collect();
        let extra: Vec<usize> = (0..existing.len() + self.points.len())
            .filter(|i| !on_ring.contains(i))
            .collect();

        let mut points = existing
            .iter()
            .map(|&v| mesh.position(v))
            .collect::<Result<Vec<_>>>()?;
        points.extend_from_slice(&self.points);
        let triangles = triangulate(&points, &rings, &extra, &normal)?;

        let mut uvs = existing
            .iter()
            .map(|&v| mesh.uv(v).map(Some))
            .collect::<Result<Vec<Option<Point2>>>>()?;
        uvs.resize(points.len(), None);
        let perimeter = perimeter_edges(&triangles);
        let axis = ProjectionAxis::from_normal(&normal);
        let mut manual_uv = face.manual_uv;
        for n in existing.len()..points.len() {
            let neighbours: Vec<usize> = perimeter
                .iter()
                .filter_map(|e| e.other(VertexId::new(n)))
                .map(VertexId::index)
                .collect();
            let averaged = match neighbours.as_slice() {
                &[a, b] => uvs[a].zip(uvs[b]).map(|(ua, ub)| ua + (ub - ua) * 0.5),
                _ => None,
            };
            uvs[n] = Some(averaged.unwrap_or_else(|| {
                warn!(
                    point = n - existing.len(),
                    "failed to find appropriate UV coordinate, setting face to auto UV"
                );
                manual_uv = false;
                axis.project(&points[n])
            }));
        }

        let fallback = average_color(mesh, &existing)?;
        let material = face.material;
        let new_vertices: Vec<Vertex> = self
            .points
            .iter()
            .enumerate()
            .map(|(j, p)| {
                Vertex::new(*p)
                    .with_normal(normal)
                    .with_color(self.colors.get(j).copied().unwrap_or(fallback))
                    .with_uv(uvs[existing.len() + j].unwrap_or_else(|| axis.project(p)))
            })
            .collect();

        mesh.remove_face(self.face)?;
        let mut ids = existing;
        let vertices: Vec<VertexId> = new_vertices.into_iter().map(|v| mesh.add_vertex(v)).collect();
        ids.extend_from_slice(&vertices);
        let triangles = triangles.into_iter().map(|t| t.map(|i| ids[i])).collect();
        let face = mesh.add_face(Face::new(triangles, material, manual_uv))?;

        debug!(points = vertices.len(), "appended points to face");
        Ok(AppendedPoints { face, vertices })
    }
}

/// Mean color of `ids`, white when empty.
pub(crate) fn average_color(mesh: &EditableMesh, ids: &[VertexId]) -> Result<Color> {
    if ids.is_empty() {
        return Ok(Color::new(1.0, 1.0, 1.0, 1.0));
    }
    let mut sum = Color::zeros();
    for &v in ids {
        sum += mesh.color(v)?;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = ids.len() as f64;
    Ok(sum / count)
}
