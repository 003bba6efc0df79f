use super::vertex::VertexId;

/// A directed step `a -> b` between two vertex entries.
///
/// Edges are transient: they are derived from face triangles during boundary
/// walking and cut planning and never stored in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Start vertex.
    pub a: VertexId,
    /// End vertex.
    pub b: VertexId,
}

impl Edge {
    /// Creates a new directed edge.
    #[must_use]
    pub fn new(a: VertexId, b: VertexId) -> Self {
        Self { a, b }
    }

    /// The same edge traversed the other way.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self { a: self.b, b: self.a }
    }

    /// Returns `true` if `v` is either endpoint.
    #[must_use]
    pub fn contains(self, v: VertexId) -> bool {
        self.a == v || self.b == v
    }

    /// Returns the endpoint opposite to `v`, or `None` if `v` is not an endpoint.
    #[must_use]
    pub fn other(self, v: VertexId) -> Option<VertexId> {
        if self.a == v {
            Some(self.b)
        } else if self.b == v {
            Some(self.a)
        } else {
            None
        }
    }
}
