//! Synthesizes indoor navigation path graphs from building-interior polygons, doors, and
//! vertical connectors. Geometry in, a walkable `Way` graph out; no OSM XML, no file I/O, no CLI
//! — those live in `indoor_osm_io` and `indoor_paths_cli`.

pub mod connector;
pub mod door;
pub mod geometry;
pub mod merger;
pub mod room;
pub mod skeleton;
mod tolerances;
mod way;

pub use connector::{Connector, ConnectorKind};
pub use door::add_doors_to_polygon;
pub use geometry::{
    in_interval, intersect, orientation, point_in_polygon, point_in_room, point_on_edge, polygon_inside_polygon,
    segment_inside_room, Edge, Line, Orientation, Point, Polygon,
};
pub use merger::{MergerNode, MergerWay, NavGraph};
pub use room::Room;
pub use skeleton::{skeletonize, Arc};
pub use tolerances::Tolerances;
pub use way::{Level, Way, WayKind};
