use crate::coords::Coordinate;
use crate::error::RoutingError;

/// A rectangular duration/distance matrix in row-major
/// `(origin, destination)` order, stored as flat vectors. A `None` cell
/// means the vendor reported that pair unreachable (or the local graph
/// found no path).
#[derive(Debug, Clone)]
pub struct RectMatrix {
    origins: Vec<Coordinate>,
    destinations: Vec<Coordinate>,
    durations: Vec<Option<f64>>,
    distances: Vec<Option<f64>>,
}

impl RectMatrix {
    pub fn new(
        origins: Vec<Coordinate>,
        destinations: Vec<Coordinate>,
        durations: Vec<Option<f64>>,
        distances: Vec<Option<f64>>,
    ) -> Result<Self, RoutingError> {
        let cells = origins.len() * destinations.len();
        if durations.len() != cells || distances.len() != cells {
            return Err(RoutingError::MalformedResponse(format!(
                "expected {} cells for {}x{} matrix, got {} durations and {} distances",
                cells,
                origins.len(),
                destinations.len(),
                durations.len(),
                distances.len(),
            )));
        }

        Ok(RectMatrix {
            origins,
            destinations,
            durations,
            distances,
        })
    }

    pub fn origins(&self) -> &[Coordinate] {
        &self.origins
    }

    pub fn destinations(&self) -> &[Coordinate] {
        &self.destinations
    }

    pub fn duration(&self, origin_index: usize, destination_index: usize) -> Option<f64> {
        self.durations[origin_index * self.destinations.len() + destination_index]
    }

    pub fn distance(&self, origin_index: usize, destination_index: usize) -> Option<f64> {
        self.distances[origin_index * self.destinations.len() + destination_index]
    }
}
