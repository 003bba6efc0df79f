use std::fmt;

use crate::math::{Color, Point2, Point3, Vector3};

/// Dense index of a vertex entry in the mesh's vertex arrays.
///
/// Indices are stable until an explicit compaction pass removes entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(usize);

impl VertexId {
    /// Wraps a raw array index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw array index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for VertexId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Attributes of one vertex entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// The 3D position of the vertex.
    pub position: Point3,
    /// Optional shading normal.
    pub normal: Option<Vector3>,
    /// RGBA color.
    pub color: Color,
    /// Texture coordinate.
    pub uv: Point2,
}

impl Vertex {
    /// Creates a white vertex at `position` with no normal and a zero UV.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            normal: None,
            color: Color::new(1.0, 1.0, 1.0, 1.0),
            uv: Point2::origin(),
        }
    }

    #[must_use]
    pub fn with_normal(mut self, normal: Vector3) -> Self {
        self.normal = Some(normal);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_uv(mut self, uv: Point2) -> Self {
        self.uv = uv;
        self
    }
}
