pub mod creation;
pub mod insertion;
pub mod merge;
pub mod query;
pub mod retriangulate;

pub use creation::{CreatePolygon, DeleteFace};
pub use insertion::{
    EdgeInsertion, FreePointInsertion, InsertDetachedVertex, InsertFreePoint, InsertOnEdge,
    InsertOnExistingVertex,
};
pub use merge::{
    DeleteVertices, MergeOutcome, MergeVertices, RemoveDegenerateTriangles, RemoveUnusedVertices,
    SplitVertices, WeldOutcome, WeldVertices,
};
pub use query::{FaceNormal, SortEdgesByAdjacency, ValidateMesh};
pub use retriangulate::{AppendPoints, AppendedPoints};
