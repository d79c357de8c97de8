//! Pure, ε-tolerant geometric predicates over 2-D points, lines, edges and polygons. Nothing in
//! here mutates its arguments or depends on the rest of the crate.

mod line;
mod point;
mod polygon;
mod predicates;

pub use line::{intersect, Line};
pub use point::{almost_same, points_approx_eq, Point};
pub use polygon::{Edge, Polygon};
pub use predicates::{
    in_interval, orientation, point_in_polygon, point_in_room, point_on_edge, polygon_inside_polygon,
    segment_inside_room, Orientation,
};
