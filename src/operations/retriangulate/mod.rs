mod append_points;

pub use append_points::{AppendPoints, AppendedPoints};

pub(crate) use append_points::average_color;
