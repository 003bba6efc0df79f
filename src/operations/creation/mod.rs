mod create_polygon;
mod delete_face;

pub use create_polygon::CreatePolygon;
pub use delete_face::DeleteFace;
