use thiserror::Error;

/// Top-level error type for the mesh editing kernel.
#[derive(Debug, Error)]
pub enum MeshEditError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),

    #[error(transparent)]
    Cut(#[from] CutError),
}

impl MeshEditError {
    /// Returns `true` for lookups of vertices, groups, faces or edges that do not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Topology(TopologyError::NotFound(_)))
    }

    /// Returns `true` when a face's triangles do not form a single boundary loop.
    #[must_use]
    pub fn is_invalid_topology(&self) -> bool {
        matches!(self, Self::Topology(TopologyError::InvalidTopology(_)))
    }

    /// Returns `true` when planar triangulation rejected the point set.
    #[must_use]
    pub fn is_triangulation_failure(&self) -> bool {
        matches!(
            self,
            Self::Tessellation(TessellationError::TriangulationFailure(_))
        )
    }

    /// Returns `true` when a commit had too little cut data to do anything.
    #[must_use]
    pub fn is_no_selection(&self) -> bool {
        matches!(self, Self::Cut(CutError::NoSelection))
    }

    /// Returns `true` for a generic commit rejection.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Cut(CutError::Failure(_)))
    }
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to mesh connectivity and lookups.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to planar triangulation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("triangulation failed: {0}")]
    TriangulationFailure(String),
}

/// Errors reported when committing a face cut.
#[derive(Debug, Error)]
pub enum CutError {
    #[error("no selection: a cut needs a target face and at least 2 points")]
    NoSelection,

    #[error("cut failed: {0}")]
    Failure(String),
}

/// Convenience type alias for results using [`MeshEditError`].
pub type Result<T> = std::result::Result<T, MeshEditError>;
