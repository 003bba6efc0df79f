pub mod cut;
pub mod error;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod tessellation;

pub use error::{MeshEditError, Result};
