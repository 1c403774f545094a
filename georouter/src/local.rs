//! Provider-free routing over a pre-built road graph. No network cost means
//! no batch-size limit and no dedup pressure: every requested cell is a
//! shortest-path computation.

use fxhash::FxHashMap;
use georouter_graph::{GeoPoint, RoadGraph, shortest_costs, shortest_path};
use tracing::debug;

use crate::backend::{MatrixBackend, RouteSegment, RouteSummary};
use crate::coords::Coordinate;
use crate::error::RoutingError;
use crate::matrix::RectMatrix;

/// Routes against a [`RoadGraph`] owned for the instance's lifetime. The
/// graph is built once before construction and only read afterwards.
pub struct LocalBackend {
    graph: RoadGraph,
}

impl LocalBackend {
    pub fn new(graph: RoadGraph) -> Self {
        LocalBackend { graph }
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    fn snap(&self, coordinate: Coordinate) -> usize {
        self.graph.nearest_node(&GeoPoint::from(coordinate))
    }
}

impl MatrixBackend for LocalBackend {
    fn matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<RectMatrix, RoutingError> {
        let target_nodes: Vec<usize> = destinations
            .iter()
            .map(|&destination| self.snap(destination))
            .collect();

        // memoize snapped origins: duplicate coordinates share one search
        let mut rows: FxHashMap<usize, Vec<Option<georouter_graph::PathCost>>> =
            FxHashMap::default();

        let cells = origins.len() * destinations.len();
        let mut durations = Vec::with_capacity(cells);
        let mut distances = Vec::with_capacity(cells);

        debug!(
            origins = origins.len(),
            destinations = destinations.len(),
            "local: computing shortest paths"
        );

        for &origin in origins {
            let source = self.snap(origin);
            let costs = rows
                .entry(source)
                .or_insert_with(|| shortest_costs(&self.graph, source, &target_nodes));

            for cost in costs.iter() {
                // unreachable pairs degrade to null cells, never errors
                durations.push(cost.map(|c| c.duration_s));
                distances.push(cost.map(|c| c.distance_m));
            }
        }

        RectMatrix::new(origins.to_vec(), destinations.to_vec(), durations, distances)
    }

    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, RoutingError> {
        let source = self.snap(origin);
        let target = self.snap(destination);

        let Some(path) = shortest_path(&self.graph, source, target) else {
            return Ok(RouteSummary {
                duration_s: None,
                distance_m: None,
                raw: serde_json::json!({
                    "source_node": source,
                    "target_node": target,
                    "reachable": false,
                }),
                segments: Vec::new(),
            });
        };

        let segments = path
            .edges
            .iter()
            .map(|&edge_id| {
                let edge = self.graph.edge(edge_id);
                let start = self.graph.node(edge.start_node());
                let end = self.graph.node(edge.end_node());

                let mut segment = RouteSegment::new(edge.length_m(), edge.travel_time_s());
                segment.start = Coordinate::new(start.lat, start.lon).ok();
                segment.end = Coordinate::new(end.lat, end.lon).ok();
                segment
            })
            .collect();

        Ok(RouteSummary {
            duration_s: Some(path.cost.duration_s),
            distance_m: Some(path.cost.distance_m),
            raw: serde_json::json!({
                "source_node": source,
                "target_node": target,
                "nodes": path.nodes,
                "reachable": true,
            }),
            segments,
        })
    }

    fn max_batch_size(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use georouter_graph::GraphBuilder;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    /// Line of three nodes 1 km apart at 36 km/h, plus an isolated node.
    fn line_graph() -> RoadGraph {
        let mut builder = GraphBuilder::new();
        let a = builder.add_node(0.0, 0.0);
        let b = builder.add_node(0.0, 0.01);
        let c = builder.add_node(0.0, 0.02);
        builder.add_node(5.0, 5.0);

        builder.add_edge_bidirectional(a, b, 1_000.0, 36.0).unwrap();
        builder.add_edge_bidirectional(b, c, 1_000.0, 36.0).unwrap();

        builder.build().unwrap()
    }

    #[test]
    fn test_matrix_snaps_and_routes() {
        let backend = LocalBackend::new(line_graph());

        // slightly off-node coordinates snap to a and c
        let matrix = backend
            .matrix(&[coord(0.001, 0.0001)], &[coord(0.001, 0.0199)])
            .unwrap();

        assert!((matrix.duration(0, 0).unwrap() - 200.0).abs() < 1e-9);
        assert!((matrix.distance(0, 0).unwrap() - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable_cell_is_null() {
        let backend = LocalBackend::new(line_graph());

        let matrix = backend
            .matrix(&[coord(0.0, 0.0)], &[coord(5.0, 5.0), coord(0.0, 0.02)])
            .unwrap();

        assert_eq!(matrix.duration(0, 0), None);
        assert!(matrix.duration(0, 1).is_some());
    }

    #[test]
    fn test_route_segments_carry_speed() {
        let backend = LocalBackend::new(line_graph());
        let summary = backend.route(coord(0.0, 0.0), coord(0.0, 0.02)).unwrap();

        assert_eq!(summary.segments.len(), 2);
        for segment in &summary.segments {
            // 36 km/h is 10 m/s
            assert!((segment.speed_ms.unwrap() - 10.0).abs() < 1e-9);
            assert!(segment.start.is_some() && segment.end.is_some());
        }
        assert_eq!(summary.raw["reachable"], true);
    }

    #[test]
    fn test_unreachable_route_is_null_not_error() {
        let backend = LocalBackend::new(line_graph());
        let summary = backend.route(coord(0.0, 0.0), coord(5.0, 5.0)).unwrap();

        assert_eq!(summary.duration_s, None);
        assert_eq!(summary.distance_m, None);
        assert_eq!(summary.raw["reachable"], false);
    }
}
