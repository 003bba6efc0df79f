//! Interactive face cutting: placing a cut path and committing it.

mod descriptor;
mod planner;
mod session;
mod settings;
mod transaction;

pub use descriptor::{CutVertexDescriptor, VertexKind};
pub use planner::{CutKind, FaceCutPlanner, ReplacementFaces};
pub use session::{CutPreview, CutSession};
pub use settings::{ClosePolicy, CutSettings};
pub use transaction::{MeshIntent, MeshTransaction};
