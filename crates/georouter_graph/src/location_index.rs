use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::geopoint::GeoPoint;

type IndexedNode = GeomWithData<GeoPoint, usize>;

/// R-tree over graph nodes for nearest-node snapping.
pub struct LocationIndex {
    tree: RTree<IndexedNode>,
}

impl LocationIndex {
    /// Bulk-load all nodes. Callers guarantee `nodes` is non-empty.
    pub fn build(nodes: &[GeoPoint]) -> LocationIndex {
        let indexed = nodes
            .iter()
            .enumerate()
            .map(|(node_id, point)| GeomWithData::new(*point, node_id))
            .collect();

        LocationIndex {
            tree: RTree::bulk_load(indexed),
        }
    }

    pub fn nearest_node(&self, point: &GeoPoint) -> usize {
        let nearest = self
            .tree
            .nearest_neighbor(&[point.lon, point.lat])
            .expect("location index is never built empty");

        nearest.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_node_exact_hit() {
        let nodes = vec![
            GeoPoint::new(42.0, -71.0),
            GeoPoint::new(42.5, -71.5),
            GeoPoint::new(43.0, -72.0),
        ];
        let index = LocationIndex::build(&nodes);

        for (node_id, point) in nodes.iter().enumerate() {
            assert_eq!(index.nearest_node(point), node_id);
        }
    }

    #[test]
    fn test_nearest_node_between_points() {
        let nodes = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)];
        let index = LocationIndex::build(&nodes);

        assert_eq!(index.nearest_node(&GeoPoint::new(0.0, 0.2)), 0);
        assert_eq!(index.nearest_node(&GeoPoint::new(0.0, 0.8)), 1);
    }
}
