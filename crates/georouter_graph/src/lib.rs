pub mod dijkstra;
pub mod error;
pub mod geopoint;
pub mod graph;
pub mod location_index;

pub use dijkstra::{PathCost, RoutePath, shortest_costs, shortest_path};
pub use error::GraphError;
pub use geopoint::GeoPoint;
pub use graph::{GraphBuilder, GraphEdge, RoadGraph};
