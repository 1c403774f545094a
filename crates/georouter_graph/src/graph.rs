use tracing::debug;

use crate::error::GraphError;
use crate::geopoint::GeoPoint;
use crate::location_index::LocationIndex;

/// A directed road segment. `travel_time_s` is derived from `length_m` and
/// `speed_kmh` at construction and never recomputed.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    id: usize,
    start_node: usize,
    end_node: usize,
    length_m: f64,
    speed_kmh: f64,
    travel_time_s: f64,
}

impl GraphEdge {
    fn new(id: usize, start_node: usize, end_node: usize, length_m: f64, speed_kmh: f64) -> Self {
        let speed_meters_per_second = speed_kmh / 3.6;

        GraphEdge {
            id,
            start_node,
            end_node,
            length_m,
            speed_kmh,
            travel_time_s: length_m / speed_meters_per_second,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn start_node(&self) -> usize {
        self.start_node
    }

    pub fn end_node(&self) -> usize {
        self.end_node
    }

    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    pub fn travel_time_s(&self) -> f64 {
        self.travel_time_s
    }
}

/// An immutable road network. Built once through [`GraphBuilder`], then only
/// traversed; there is no mutation API after `build`.
pub struct RoadGraph {
    nodes: Vec<GeoPoint>,
    edges: Vec<GraphEdge>,
    adjacency_list: Vec<Vec<usize>>,
    location_index: LocationIndex,
}

impl RoadGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, node_id: usize) -> &GeoPoint {
        &self.nodes[node_id]
    }

    pub fn edge(&self, edge_id: usize) -> &GraphEdge {
        &self.edges[edge_id]
    }

    /// Outgoing edges of `node_id`.
    pub fn edges_from(&self, node_id: usize) -> impl Iterator<Item = &GraphEdge> {
        self.adjacency_list[node_id]
            .iter()
            .map(|&edge_id| &self.edges[edge_id])
    }

    /// Snap arbitrary coordinates to the closest graph node by haversine
    /// distance.
    pub fn nearest_node(&self, point: &GeoPoint) -> usize {
        self.location_index.nearest_node(point)
    }
}

#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<GeoPoint>,
    edges: Vec<GraphEdge>,
    adjacency_list: Vec<Vec<usize>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder::default()
    }

    pub fn add_node(&mut self, lat: f64, lon: f64) -> usize {
        let node_id = self.nodes.len();
        self.nodes.push(GeoPoint::new(lat, lon));
        self.adjacency_list.push(Vec::new());
        node_id
    }

    /// Add a one-way segment from `start_node` to `end_node`.
    pub fn add_edge(
        &mut self,
        start_node: usize,
        end_node: usize,
        length_m: f64,
        speed_kmh: f64,
    ) -> Result<usize, GraphError> {
        if start_node >= self.nodes.len() {
            return Err(GraphError::InvalidNode(start_node));
        }
        if end_node >= self.nodes.len() {
            return Err(GraphError::InvalidNode(end_node));
        }
        if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
            return Err(GraphError::InvalidSpeed(speed_kmh));
        }
        if !length_m.is_finite() || length_m < 0.0 {
            return Err(GraphError::InvalidLength(length_m));
        }

        let edge_id = self.edges.len();
        self.edges
            .push(GraphEdge::new(edge_id, start_node, end_node, length_m, speed_kmh));
        self.adjacency_list[start_node].push(edge_id);

        Ok(edge_id)
    }

    /// Add a two-way segment as a pair of directed edges sharing length and
    /// speed.
    pub fn add_edge_bidirectional(
        &mut self,
        node_a: usize,
        node_b: usize,
        length_m: f64,
        speed_kmh: f64,
    ) -> Result<(usize, usize), GraphError> {
        let forward = self.add_edge(node_a, node_b, length_m, speed_kmh)?;
        let backward = self.add_edge(node_b, node_a, length_m, speed_kmh)?;
        Ok((forward, backward))
    }

    pub fn build(self) -> Result<RoadGraph, GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "building location index"
        );

        let location_index = LocationIndex::build(&self.nodes);

        Ok(RoadGraph {
            nodes: self.nodes,
            edges: self.edges,
            adjacency_list: self.adjacency_list,
            location_index,
        })
    }
}
