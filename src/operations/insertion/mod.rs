mod existing_vertex;
mod free_point;
mod on_edge;

pub use existing_vertex::InsertOnExistingVertex;
pub use free_point::{FreePointInsertion, InsertDetachedVertex, InsertFreePoint};
pub use on_edge::{EdgeInsertion, InsertOnEdge};

pub(crate) use on_edge::nearest_boundary_edge;
