pub mod edge;
pub mod face;
pub mod shared;
pub mod vertex;

pub use edge::Edge;
pub use face::{Face, FaceId, MaterialId};
pub use shared::{GroupId, SharedVertexGroup, SharedVertexIndex};
pub use vertex::{Vertex, VertexId};

use std::collections::HashSet;

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{GeometryError, MeshEditError, Result, TopologyError};
use crate::math::polygon_3d::polygon_normal;
use crate::math::projection::ProjectionAxis;
use crate::math::{Color, Point2, Point3, Vector3, POSITION_EPSILON};
use crate::tessellation::triangulate;

/// Editable polygon mesh.
///
/// Vertex attributes are stored in dense arrays addressed by [`VertexId`];
/// faces live in an arena keyed by [`FaceId`]. Every vertex entry belongs to
/// one shared group, and the group's position is the vertex's effective
/// position. Each entry also remembers its own position, which it takes back
/// when split out of a group.
#[derive(Debug, Clone, Default)]
pub struct EditableMesh {
    positions: Vec<Point3>,
    normals: Vec<Option<Vector3>>,
    colors: Vec<Color>,
    uvs: Vec<Point2>,
    faces: SlotMap<FaceId, Face>,
    shared: SharedVertexIndex,
}

impl EditableMesh {
    /// Creates a new, empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from polygons over a shared position list.
    ///
    /// Each polygon gets its own vertex entries; entries created from the
    /// same input index are placed in one shared group. Polygons are
    /// triangulated along their Newell normal and receive planar UVs.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for out-of-range indices, `Degenerate` for polygons
    /// without area, and `TriangulationFailure` if a polygon cannot be
    /// triangulated.
    pub fn from_polygons(positions: &[Point3], polygons: &[Vec<usize>]) -> Result<Self> {
        let mut mesh = Self::new();
        let mut groups: Vec<Option<GroupId>> = vec![None; positions.len()];

        for polygon in polygons {
            let points = polygon
                .iter()
                .map(|&i| {
                    positions
                        .get(i)
                        .copied()
                        .ok_or_else(|| MeshEditError::from(TopologyError::NotFound(format!("position {i}"))))
                })
                .collect::<Result<Vec<_>>>()?;
            let normal = polygon_normal(&points)
                .ok_or_else(|| GeometryError::Degenerate("polygon has no area".into()))?;
            let ring: Vec<usize> = (0..points.len()).collect();
            let local = triangulate(&points, &[ring], &[], &normal)?;

            let axis = ProjectionAxis::from_normal(&normal);
            let mut ids = Vec::with_capacity(polygon.len());
            for (&src, p) in polygon.iter().zip(&points) {
                let vertex = Vertex::new(*p).with_uv(axis.project(p));
                let id = match groups[src] {
                    Some(group) => mesh.add_vertex_in_group(vertex, group)?,
                    None => {
                        let id = mesh.add_vertex(vertex);
                        groups[src] = Some(mesh.group_of(id)?);
                        id
                    }
                };
                ids.push(id);
            }

            let triangles = local.into_iter().map(|t| t.map(|i| ids[i])).collect();
            mesh.add_face(Face::new(triangles, MaterialId::default(), false))?;
        }
        Ok(mesh)
    }

    /// Builds a single-face mesh from a triangle soup.
    ///
    /// Vertex entries map one-to-one to `positions`; entries at coincident
    /// positions are grouped.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for out-of-range indices.
    pub fn from_triangles(positions: &[Point3], triangles: &[[usize; 3]]) -> Result<Self> {
        let mut mesh = Self::new();
        for p in positions {
            mesh.push_entry(&Vertex::new(*p));
        }
        mesh.shared = SharedVertexIndex::from_positions(positions, POSITION_EPSILON);
        let triangles = triangles
            .iter()
            .map(|t| t.map(VertexId::new))
            .collect();
        mesh.add_face(Face::new(triangles, MaterialId::default(), false))?;
        Ok(mesh)
    }

    // --- Vertex operations ---

    /// Number of vertex entries.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Appends a vertex entry in a new singleton group.
    pub fn add_vertex(&mut self, vertex: Vertex) -> VertexId {
        let id = self.push_entry(&vertex);
        self.shared.insert_singleton(id, vertex.position);
        id
    }

    /// Appends a vertex entry as a member of an existing group.
    ///
    /// The entry's own position is the one given; its effective position is
    /// the group's.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn add_vertex_in_group(&mut self, vertex: Vertex, group: GroupId) -> Result<VertexId> {
        self.shared.group(group)?;
        let id = self.push_entry(&vertex);
        self.shared.join(id, group)?;
        Ok(id)
    }

    /// Returns `NotFound` unless `id` addresses a vertex entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is out of range.
    pub fn check_vertex(&self, id: VertexId) -> Result<()> {
        if id.index() < self.positions.len() {
            Ok(())
        } else {
            Err(TopologyError::NotFound(format!("vertex {id}")).into())
        }
    }

    /// Returns the attributes of a vertex, with its effective position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the vertex does not exist.
    pub fn vertex(&self, id: VertexId) -> Result<Vertex> {
        self.check_vertex(id)?;
        let i = id.index();
        Ok(Vertex {
            position: self.shared.position_of(id)?,
            normal: self.normals[i],
            color: self.colors[i],
            uv: self.uvs[i],
        })
    }

    /// Effective position: the position of the vertex's shared group.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the vertex does not exist.
    pub fn position(&self, id: VertexId) -> Result<Point3> {
        self.check_vertex(id)?;
        self.shared.position_of(id)
    }

    /// The position the entry was created with or last moved to.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the vertex does not exist.
    pub fn own_position(&self, id: VertexId) -> Result<Point3> {
        self.check_vertex(id)?;
        Ok(self.positions[id.index()])
    }

    /// Effective positions of all entries, indexed by vertex id.
    ///
    /// Entries missing from the shared index fall back to their own position.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, own)| self.shared.position_of(VertexId::new(i)).unwrap_or(*own))
            .collect()
    }

    /// Own positions of all entries, indexed by vertex id.
    #[must_use]
    pub fn own_positions(&self) -> &[Point3] {
        &self.positions
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vertex does not exist.
    pub fn uv(&self, id: VertexId) -> Result<Point2> {
        self.check_vertex(id)?;
        Ok(self.uvs[id.index()])
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vertex does not exist.
    pub fn set_uv(&mut self, id: VertexId, uv: Point2) -> Result<()> {
        self.check_vertex(id)?;
        self.uvs[id.index()] = uv;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vertex does not exist.
    pub fn color(&self, id: VertexId) -> Result<Color> {
        self.check_vertex(id)?;
        Ok(self.colors[id.index()])
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vertex does not exist.
    pub fn set_color(&mut self, id: VertexId, color: Color) -> Result<()> {
        self.check_vertex(id)?;
        self.colors[id.index()] = color;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vertex does not exist.
    pub fn normal(&self, id: VertexId) -> Result<Option<Vector3>> {
        self.check_vertex(id)?;
        Ok(self.normals[id.index()])
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vertex does not exist.
    pub fn set_normal(&mut self, id: VertexId, normal: Option<Vector3>) -> Result<()> {
        self.check_vertex(id)?;
        self.normals[id.index()] = normal;
        Ok(())
    }

    // --- Shared groups ---

    /// The shared vertex index.
    #[must_use]
    pub fn shared(&self) -> &SharedVertexIndex {
        &self.shared
    }

    pub(crate) fn shared_mut(&mut self) -> &mut SharedVertexIndex {
        &mut self.shared
    }

    /// Returns the group containing `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the vertex is not registered.
    pub fn group_of(&self, id: VertexId) -> Result<GroupId> {
        self.shared.group_of(id)
    }

    /// Moves a group and every member's own position by `delta`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the group does not exist.
    pub fn translate_group(&mut self, group: GroupId, delta: &Vector3) -> Result<()> {
        let g = self.shared.group(group)?;
        let target = g.position() + delta;
        for &m in g.members() {
            self.positions[m.index()] += delta;
        }
        self.shared.set_position(group, target)
    }

    // --- Face operations ---

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns a face by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist.
    pub fn face(&self, id: FaceId) -> Result<&Face> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::NotFound("face".into()).into())
    }

    /// Returns a mutable face by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut Face> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::NotFound("face".into()).into())
    }

    /// Iterates over all faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter()
    }

    /// Ids of all faces.
    #[must_use]
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces.keys().collect()
    }

    /// Inserts a face.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face references a missing vertex.
    pub fn add_face(&mut self, face: Face) -> Result<FaceId> {
        for &v in face.distinct_indices() {
            self.check_vertex(v)?;
        }
        Ok(self.faces.insert(face))
    }

    /// Removes a face and returns it. Its vertices stay in the mesh.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist.
    pub fn remove_face(&mut self, id: FaceId) -> Result<Face> {
        self.faces
            .remove(id)
            .ok_or_else(|| TopologyError::NotFound("face".into()).into())
    }

    /// Effective positions of a face's distinct vertices.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the face does not exist.
    pub fn face_positions(&self, id: FaceId) -> Result<Vec<Point3>> {
        self.face(id)?
            .distinct_indices()
            .iter()
            .map(|&v| self.position(v))
            .collect()
    }

    /// Vertex ids referenced by at least one face.
    #[must_use]
    pub fn used_vertices(&self) -> HashSet<VertexId> {
        self.faces
            .values()
            .flat_map(|f| f.distinct_indices().iter().copied())
            .collect()
    }

    /// Removes vertex entries and shifts all larger ids down.
    ///
    /// Faces and the shared index are remapped. Callers guarantee that no
    /// face references a removed id. Returns the removed ids, sorted.
    pub(crate) fn delete_vertex_entries(&mut self, ids: &[VertexId]) -> Vec<VertexId> {
        let mut removed: Vec<VertexId> = ids
            .iter()
            .copied()
            .filter(|id| id.index() < self.positions.len())
            .collect();
        removed.sort_unstable();
        removed.dedup();
        if removed.is_empty() {
            return removed;
        }

        let keep = |i: usize| removed.binary_search(&VertexId::new(i)).is_err();
        let mut i = 0;
        self.positions.retain(|_| {
            i += 1;
            keep(i - 1)
        });
        let mut i = 0;
        self.normals.retain(|_| {
            i += 1;
            keep(i - 1)
        });
        let mut i = 0;
        self.colors.retain(|_| {
            i += 1;
            keep(i - 1)
        });
        let mut i = 0;
        self.uvs.retain(|_| {
            i += 1;
            keep(i - 1)
        });

        for face in self.faces.values_mut() {
            face.remap(|v| {
                let below = removed.partition_point(|r| r.index() < v.index());
                VertexId::new(v.index() - below)
            });
        }
        self.shared.remove_and_shift(&removed);
        debug!(count = removed.len(), "compacted vertex entries");
        removed
    }

    fn push_entry(&mut self, vertex: &Vertex) -> VertexId {
        let id = VertexId::new(self.positions.len());
        self.positions.push(vertex.position);
        self.normals.push(vertex.normal);
        self.colors.push(vertex.color);
        self.uvs.push(vertex.uv);
        id
    }
}
