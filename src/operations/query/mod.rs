mod face_normal;
mod is_valid;
mod sort_edges;

pub use face_normal::FaceNormal;
pub use is_valid::ValidateMesh;
pub use sort_edges::SortEdgesByAdjacency;

pub(crate) use face_normal::face_normal;
pub(crate) use sort_edges::{boundary_loops, sorted_boundary};
