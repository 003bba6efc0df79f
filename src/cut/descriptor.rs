use crate::math::{Point3, Vector3};

bitflags::bitflags! {
    /// How a cut point relates to the target face.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VertexKind: u32 {
        /// A free point inside the face.
        const NEW_VERTEX = 0b0000_0001;
        /// Coincides with a vertex of the face boundary.
        const EXISTING_VERTEX = 0b0000_0010;
        /// Lies on an edge of the face boundary.
        const ADDED_ON_EDGE = 0b0000_0100;
        /// Coincides with an earlier point of the same path.
        const VERTEX_IN_SHAPE = 0b0000_1000;
    }
}

impl VertexKind {
    /// Returns `true` for points that lie on the face boundary.
    #[must_use]
    pub fn touches_boundary(self) -> bool {
        self.intersects(Self::EXISTING_VERTEX | Self::ADDED_ON_EDGE)
    }
}

/// One placed point of a pending cut path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutVertexDescriptor {
    /// Snapped position of the point.
    pub position: Point3,
    /// Surface normal at the point.
    pub normal: Vector3,
    /// Classification of the point.
    pub kind: VertexKind,
}

impl CutVertexDescriptor {
    #[must_use]
    pub fn new(position: Point3, normal: Vector3, kind: VertexKind) -> Self {
        Self {
            position,
            normal,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_flag_combines_with_boundary_kinds() {
        let kind = VertexKind::EXISTING_VERTEX | VertexKind::VERTEX_IN_SHAPE;
        assert!(kind.touches_boundary());
        assert!(kind.contains(VertexKind::VERTEX_IN_SHAPE));
        assert!(!(VertexKind::NEW_VERTEX | VertexKind::VERTEX_IN_SHAPE).touches_boundary());
    }
}
