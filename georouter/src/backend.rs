use serde::Serialize;

use crate::coords::Coordinate;
use crate::error::RoutingError;
use crate::matrix::RectMatrix;

/// One leg of a resolved route. `speed_ms` is derived as
/// `distance_m / duration_s` and absent for zero-duration segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteSegment {
    pub distance_m: f64,
    pub duration_s: f64,
    pub speed_ms: Option<f64>,
    pub start: Option<Coordinate>,
    pub end: Option<Coordinate>,
}

impl RouteSegment {
    pub fn new(distance_m: f64, duration_s: f64) -> Self {
        RouteSegment {
            distance_m,
            duration_s,
            speed_ms: (duration_s > 0.0).then(|| distance_m / duration_s),
            start: None,
            end: None,
        }
    }

}

/// A single-pair answer: totals, the vendor's raw payload for diagnosis,
/// and a per-segment geometry table when the provider exposes one.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub duration_s: Option<f64>,
    pub distance_m: Option<f64>,
    pub raw: serde_json::Value,
    pub segments: Vec<RouteSegment>,
}

/// The one seam every provider implements: a rectangular matrix call and a
/// single-pair route call. Object-safe so callers (and tests) can swap in
/// any resolver.
pub trait MatrixBackend {
    /// Full cross-product matrix for the given dimension lists, blocking
    /// until resolved.
    fn matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<RectMatrix, RoutingError>;

    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, RoutingError>;

    /// Largest origin-destination pair count a single matrix call may
    /// represent. `None` means unbounded (the local graph pays no network
    /// cost per call).
    fn max_batch_size(&self) -> Option<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_speed_derivation() {
        let segment = RouteSegment::new(100.0, 8.0);
        assert_eq!(segment.speed_ms, Some(12.5));
    }

    #[test]
    fn test_zero_duration_has_no_speed() {
        let segment = RouteSegment::new(100.0, 0.0);
        assert_eq!(segment.speed_ms, None);
    }
}
