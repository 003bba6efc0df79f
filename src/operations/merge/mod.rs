mod cleanup;
mod merge_vertices;

pub use cleanup::{DeleteVertices, RemoveDegenerateTriangles, RemoveUnusedVertices};
pub use merge_vertices::{MergeOutcome, MergeVertices, SplitVertices, WeldOutcome, WeldVertices};
