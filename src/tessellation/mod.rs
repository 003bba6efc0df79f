mod triangulate_polygon;

pub use triangulate_polygon::TriangulatePolygon;

pub(crate) use triangulate_polygon::triangulate;
