use std::collections::BinaryHeap;

use fxhash::FxHashSet;

use crate::graph::RoadGraph;

/// Accumulated cost of a shortest path, weighted by travel time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathCost {
    pub duration_s: f64,
    pub distance_m: f64,
}

/// A resolved path: the visited node sequence plus the edges taken.
#[derive(Debug, Clone)]
pub struct RoutePath {
    pub cost: PathCost,
    pub nodes: Vec<usize>,
    pub edges: Vec<usize>,
}

struct QueueEntry {
    travel_time_s: f64,
    node: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.travel_time_s == other.travel_time_s
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // min-heap on travel time
        other
            .travel_time_s
            .partial_cmp(&self.travel_time_s)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

struct NodeLabel {
    travel_time_s: f64,
    distance_m: f64,
    parent_edge: Option<usize>,
    settled: bool,
}

impl Default for NodeLabel {
    fn default() -> Self {
        NodeLabel {
            travel_time_s: f64::INFINITY,
            distance_m: f64::INFINITY,
            parent_edge: None,
            settled: false,
        }
    }
}

fn run_dijkstra(
    graph: &RoadGraph,
    source: usize,
    targets: Option<&FxHashSet<usize>>,
) -> Vec<NodeLabel> {
    let mut labels: Vec<NodeLabel> = (0..graph.node_count()).map(|_| NodeLabel::default()).collect();
    let mut queue = BinaryHeap::new();
    let mut remaining = targets.map(|t| t.len());

    labels[source].travel_time_s = 0.0;
    labels[source].distance_m = 0.0;
    queue.push(QueueEntry {
        travel_time_s: 0.0,
        node: source,
    });

    while let Some(entry) = queue.pop() {
        if labels[entry.node].settled {
            continue;
        }
        labels[entry.node].settled = true;

        // early exit once every requested target has settled
        if let (Some(remaining), Some(targets)) = (remaining.as_mut(), targets) {
            if targets.contains(&entry.node) {
                *remaining -= 1;
                if *remaining == 0 {
                    break;
                }
            }
        }

        let current_time = labels[entry.node].travel_time_s;
        let current_distance = labels[entry.node].distance_m;

        for edge in graph.edges_from(entry.node) {
            let next = edge.end_node();
            if labels[next].settled {
                continue;
            }

            let candidate_time = current_time + edge.travel_time_s();
            if candidate_time < labels[next].travel_time_s {
                labels[next].travel_time_s = candidate_time;
                labels[next].distance_m = current_distance + edge.length_m();
                labels[next].parent_edge = Some(edge.id());
                queue.push(QueueEntry {
                    travel_time_s: candidate_time,
                    node: next,
                });
            }
        }
    }

    labels
}

/// One-to-many shortest-path costs from `source`, weighted by travel time.
/// Returns one entry per target, `None` when the target is unreachable.
pub fn shortest_costs(graph: &RoadGraph, source: usize, targets: &[usize]) -> Vec<Option<PathCost>> {
    let target_set: FxHashSet<usize> = targets.iter().copied().collect();
    let labels = run_dijkstra(graph, source, Some(&target_set));

    targets
        .iter()
        .map(|&target| {
            let label = &labels[target];
            label.settled.then_some(PathCost {
                duration_s: label.travel_time_s,
                distance_m: label.distance_m,
            })
        })
        .collect()
}

/// Single-pair shortest path with the node and edge sequence, or `None` when
/// no path exists.
pub fn shortest_path(graph: &RoadGraph, source: usize, target: usize) -> Option<RoutePath> {
    let target_set: FxHashSet<usize> = std::iter::once(target).collect();
    let labels = run_dijkstra(graph, source, Some(&target_set));

    if !labels[target].settled {
        return None;
    }

    let mut edges = Vec::new();
    let mut nodes = vec![target];
    let mut current = target;
    while let Some(edge_id) = labels[current].parent_edge {
        let edge = graph.edge(edge_id);
        edges.push(edge_id);
        current = edge.start_node();
        nodes.push(current);
    }
    edges.reverse();
    nodes.reverse();

    Some(RoutePath {
        cost: PathCost {
            duration_s: labels[target].travel_time_s,
            distance_m: labels[target].distance_m,
        },
        nodes,
        edges,
    })
}
