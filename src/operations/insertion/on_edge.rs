use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::distance_3d::{closest_point_on_segment, point_to_segment_dist};
use crate::math::Point3;
use crate::mesh::{EditableMesh, Edge, Face, FaceId, GroupId, MaterialId, Vertex, VertexId};
use crate::operations::query::{boundary_loops, face_normal};
use crate::tessellation::triangulate;

/// Splits the boundary edge of a face nearest to a point.
///
/// The new vertex sits at the literal position given, in its own shared
/// group. Every other face sharing the edge (by group identity) is split at
/// the same spot with its own vertex entry joined to that group.
pub struct InsertOnEdge {
    face: FaceId,
    position: Point3,
}

/// Result of [`InsertOnEdge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeInsertion {
    /// The new vertex in the target face.
    pub vertex: VertexId,
    /// The face that replaced the target face.
    pub face: FaceId,
    /// The edge that was split.
    pub edge: Edge,
}

impl InsertOnEdge {
    /// Creates a new `InsertOnEdge` operation.
    #[must_use]
    pub fn new(face: FaceId, position: Point3) -> Self {
        Self { face, position }
    }

    /// Executes the insertion.
    ///
    /// Every affected face is re-triangulated before the mesh changes, so a
    /// failure leaves the mesh untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist, `InvalidTopology` if a
    /// boundary cannot be walked, and `TriangulationFailure` if an affected
    /// face cannot be re-triangulated.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<EdgeInsertion> {
        let face = mesh.face(self.face)?;
        let edge = nearest_boundary_edge(mesh, face, &self.position)?;
        let target = SplitPlan::new(mesh, self.face, edge, &self.position)?;

        let key = group_pair(mesh, edge)?;
        let mut neighbours = Vec::new();
        for (id, other) in mesh.faces() {
            if id == self.face {
                continue;
            }
            for &e in other.boundary_edges() {
                if group_pair(mesh, e)? == key {
                    neighbours.push(SplitPlan::new(mesh, id, e, &self.position)?);
                    break;
                }
            }
        }

        let vertex = mesh.add_vertex(target.vertex.clone());
        let group = mesh.group_of(vertex)?;
        let face = target.apply(mesh, vertex)?;
        for plan in neighbours {
            let copy = mesh.add_vertex_in_group(plan.vertex.clone(), group)?;
            plan.apply(mesh, copy)?;
        }

        debug!(%vertex, edge_a = %edge.a, edge_b = %edge.b, "inserted vertex on edge");
        Ok(EdgeInsertion { vertex, face, edge })
    }
}

/// Boundary edge of `face` closest to `position`; the first edge wins ties.
pub(crate) fn nearest_boundary_edge(
    mesh: &EditableMesh,
    face: &Face,
    position: &Point3,
) -> Result<Edge> {
    let mut best: Option<(f64, Edge)> = None;
    for ring in boundary_loops(face.boundary_edges())? {
        for e in ring {
            let d = point_to_segment_dist(position, &mesh.position(e.a)?, &mesh.position(e.b)?);
            if best.map_or(true, |(nearest, _)| d < nearest) {
                best = Some((d, e));
            }
        }
    }
    best.map(|(_, e)| e)
        .ok_or_else(|| TopologyError::NotFound("boundary edge".into()).into())
}

fn group_pair(mesh: &EditableMesh, e: Edge) -> Result<(GroupId, GroupId)> {
    let (a, b) = (mesh.group_of(e.a)?, mesh.group_of(e.b)?);
    Ok(if a <= b { (a, b) } else { (b, a) })
}

/// A face re-triangulated around one not-yet-created boundary vertex
/// (`None` in `triangles`).
struct SplitPlan {
    face: FaceId,
    vertex: Vertex,
    triangles: Vec<[Option<VertexId>; 3]>,
    material: MaterialId,
    manual_uv: bool,
}

impl SplitPlan {
    fn new(mesh: &EditableMesh, face_id: FaceId, edge: Edge, position: &Point3) -> Result<Self> {
        let face = mesh.face(face_id)?;
        let normal = face_normal(mesh, face)?;
        let (pa, pb) = (mesh.position(edge.a)?, mesh.position(edge.b)?);
        let (_, t) = closest_point_on_segment(position, &pa, &pb);

        let (ua, ub) = (mesh.uv(edge.a)?, mesh.uv(edge.b)?);
        let (ca, cb) = (mesh.color(edge.a)?, mesh.color(edge.b)?);
        let vertex = Vertex::new(*position)
            .with_uv(ua + (ub - ua) * t)
            .with_color(ca.lerp(&cb, t))
            .with_normal(normal);

        let mut slots: Vec<Option<VertexId>> = Vec::new();
        let mut index: HashMap<VertexId, usize> = HashMap::new();
        let mut slot_of = |v: VertexId, slots: &mut Vec<Option<VertexId>>| {
            *index.entry(v).or_insert_with(|| {
                slots.push(Some(v));
                slots.len() - 1
            })
        };

        let mut rings = Vec::new();
        let mut new_slot = None;
        for ring in boundary_loops(face.boundary_edges())? {
            let mut r = Vec::with_capacity(ring.len() + 1);
            for e in ring {
                r.push(slot_of(e.a, &mut slots));
                if e == edge {
                    slots.push(None);
                    new_slot = Some(slots.len() - 1);
                    r.push(slots.len() - 1);
                }
            }
            rings.push(r);
        }
        if new_slot.is_none() {
            return Err(TopologyError::NotFound(format!(
                "edge {} -> {} on face boundary",
                edge.a, edge.b
            ))
            .into());
        }
        let extra: Vec<usize> = face
            .distinct_indices()
            .iter()
            .filter(|v| !index.contains_key(v))
            .map(|&v| {
                slots.push(Some(v));
                slots.len() - 1
            })
            .collect();

        let points = slots
            .iter()
            .map(|s| s.map_or(Ok(*position), |v| mesh.position(v)))
            .collect::<Result<Vec<_>>>()?;
        let triangles = triangulate(&points, &rings, &extra, &normal)?
            .into_iter()
            .map(|t| t.map(|i| slots[i]))
            .collect();

        Ok(Self {
            face: face_id,
            vertex,
            triangles,
            material: face.material,
            manual_uv: face.manual_uv,
        })
    }

    fn apply(self, mesh: &mut EditableMesh, vertex: VertexId) -> Result<FaceId> {
        mesh.remove_face(self.face)?;
        let triangles = self
            .triangles
            .into_iter()
            .map(|t| t.map(|s| s.unwrap_or(vertex)))
            .collect();
        mesh.add_face(Face::new(triangles, self.material, self.manual_uv))
    }
}
