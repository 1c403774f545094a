//! A unified client for routing web services and a local road-graph router.
//!
//! Given an origin and a destination (or index-aligned lists of them), every
//! provider answers the same three questions through one facade: travel
//! duration, travel distance, and the path taken. Large paired requests are
//! split into provider-compliant batches, resolved one matrix call at a time,
//! and reassembled into a single table in the caller's input order.

pub mod assemble;
pub mod backend;
pub mod batch;
pub mod coords;
pub mod error;
pub mod local;
pub mod matrix;
pub mod providers;
pub mod router;
pub mod table;
pub mod units;

pub use backend::{MatrixBackend, RouteSegment, RouteSummary};
pub use batch::{GroupKey, OdBatch, OdPair};
pub use coords::{Coordinate, IntoCoordinate, normalize_coords};
pub use error::{RoutingError, ValidationError};
pub use matrix::RectMatrix;
pub use router::{Provider, Router, RouterConfig, TravelMode};
pub use table::{DistanceTable, TableRow};
