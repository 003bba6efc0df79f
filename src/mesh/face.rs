use std::collections::HashSet;

use super::edge::Edge;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the mesh.
    pub struct FaceId;
}

/// Opaque material reference carried by a face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// A triangulated polygon.
///
/// The triangle list is the source of truth; the distinct indices and the
/// boundary edges are caches rebuilt whenever the triangles change.
#[derive(Debug, Clone)]
pub struct Face {
    triangles: Vec<[VertexId; 3]>,
    distinct: Vec<VertexId>,
    boundary: Vec<Edge>,
    /// If `true`, UVs were authored explicitly and must be preserved.
    /// If `false`, the face is auto-unwrapped by its owner.
    pub manual_uv: bool,
    /// Material reference, opaque to the kernel.
    pub material: MaterialId,
}

impl Face {
    /// Creates a face from its triangles.
    #[must_use]
    pub fn new(triangles: Vec<[VertexId; 3]>, material: MaterialId, manual_uv: bool) -> Self {
        let mut face = Self {
            triangles,
            distinct: Vec::new(),
            boundary: Vec::new(),
            manual_uv,
            material,
        };
        face.rebuild_caches();
        face
    }

    /// The triangles of the face, counter-clockwise around the face normal.
    #[must_use]
    pub fn triangles(&self) -> &[[VertexId; 3]] {
        &self.triangles
    }

    /// Unique vertex ids referenced by the face, in first-appearance order.
    #[must_use]
    pub fn distinct_indices(&self) -> &[VertexId] {
        &self.distinct
    }

    /// Directed edges whose reverse is not part of the face.
    ///
    /// Unordered; see [`SortEdgesByAdjacency`](crate::operations::query::SortEdgesByAdjacency)
    /// for the walked boundary loop.
    #[must_use]
    pub fn boundary_edges(&self) -> &[Edge] {
        &self.boundary
    }

    /// Returns `true` if any triangle references `v`.
    #[must_use]
    pub fn contains(&self, v: VertexId) -> bool {
        self.distinct.contains(&v)
    }

    /// A face is valid when it has at least one triangle and no triangle
    /// repeats a corner.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.triangles.is_empty()
            && self
                .triangles
                .iter()
                .all(|[a, b, c]| a != b && b != c && a != c)
    }

    /// Flips the winding of every triangle.
    pub fn reverse(&mut self) {
        for tri in &mut self.triangles {
            tri.swap(1, 2);
        }
        self.rebuild_caches();
    }

    /// Rewrites every vertex reference through `map`.
    pub(crate) fn remap(&mut self, mut map: impl FnMut(VertexId) -> VertexId) {
        for tri in &mut self.triangles {
            for v in tri.iter_mut() {
                *v = map(*v);
            }
        }
        self.rebuild_caches();
    }

    /// Keeps only the triangles for which `keep` returns `true`.
    ///
    /// Returns the removed triangles.
    pub(crate) fn retain_triangles(
        &mut self,
        mut keep: impl FnMut(&[VertexId; 3]) -> bool,
    ) -> Vec<[VertexId; 3]> {
        let mut removed = Vec::new();
        self.triangles.retain(|tri| {
            if keep(tri) {
                true
            } else {
                removed.push(*tri);
                false
            }
        });
        if !removed.is_empty() {
            self.rebuild_caches();
        }
        removed
    }

    fn rebuild_caches(&mut self) {
        let mut seen = HashSet::new();
        self.distinct = self
            .triangles
            .iter()
            .flatten()
            .copied()
            .filter(|v| seen.insert(*v))
            .collect();
        self.boundary = perimeter_edges(&self.triangles);
    }
}

/// Directed edges of `triangles` whose reverse does not occur, in triangle order.
pub(crate) fn perimeter_edges<V>(triangles: &[[V; 3]]) -> Vec<Edge>
where
    V: Copy + Into<VertexId>,
{
    let directed: Vec<Edge> = triangles
        .iter()
        .flat_map(|&[a, b, c]| {
            let (a, b, c) = (a.into(), b.into(), c.into());
            [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)]
        })
        .collect();
    let all: HashSet<Edge> = directed.iter().copied().collect();

    let mut seen = HashSet::new();
    directed
        .into_iter()
        .filter(|e| e.a != e.b && !all.contains(&e.reversed()) && seen.insert(*e))
        .collect()
}
