use std::fmt::Display;
use std::time::Duration;

use georouter_graph::RoadGraph;
use tracing::debug;

use crate::assemble::assemble;
use crate::backend::{MatrixBackend, RouteSummary};
use crate::batch::{OdBatch, build_batches};
use crate::coords::{Coordinate, IntoCoordinate, normalize_coords};
use crate::error::{RoutingError, ValidationError};
use crate::local::LocalBackend;
use crate::matrix::RectMatrix;
use crate::providers::bing::{BingClient, BingClientParams};
use crate::providers::google::{GoogleClient, GoogleClientParams};
use crate::providers::osrm::{OSRM_PUBLIC_URL, OsrmClient, OsrmClientParams};
use crate::table::{DistanceTable, OdColumns, TableRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
}

impl TravelMode {
    fn osrm_profile(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "cycling",
        }
    }

    fn google_mode(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
        }
    }

    fn bing_mode(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            // Bing has no cycling mode; drive-time is the closest answer
            TravelMode::Bicycling => "driving",
        }
    }
}

/// One flat configuration shared by every remote provider. Fields a
/// provider does not use are ignored by its constructor.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub api_key: Option<String>,
    pub mode: TravelMode,
    pub timeout: Duration,
    pub language: String,
    pub base_url: Option<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            api_key: None,
            mode: TravelMode::Driving,
            timeout: Duration::from_secs(10),
            language: "en".to_string(),
            base_url: None,
        }
    }
}

impl RouterConfig {
    fn require_api_key(&self, provider: &'static str) -> Result<String, ValidationError> {
        self.api_key
            .clone()
            .ok_or(ValidationError::MissingApiKey(provider))
    }
}

/// The closed set of supported remote providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Osrm,
    Google,
    Bing,
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Provider::Osrm => "osrm",
                Provider::Google => "google",
                Provider::Bing => "bing",
            }
        )
    }
}

/// The uniform front door. Construct once per provider (or per local
/// graph), then query repeatedly; instances are read-only after
/// construction.
pub struct Router {
    backend: Box<dyn MatrixBackend>,
}

impl Router {
    /// Build a remote-provider router from one flat config.
    pub fn new(provider: Provider, config: RouterConfig) -> Result<Self, RoutingError> {
        let backend: Box<dyn MatrixBackend> = match provider {
            Provider::Osrm => Box::new(OsrmClient::new(OsrmClientParams {
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| OSRM_PUBLIC_URL.to_string()),
                profile: config.mode.osrm_profile().to_string(),
                timeout: config.timeout,
            })?),
            Provider::Google => Box::new(GoogleClient::new(GoogleClientParams {
                api_key: config.require_api_key("google")?,
                mode: config.mode.google_mode().to_string(),
                language: config.language.clone(),
                timeout: config.timeout,
            })?),
            Provider::Bing => Box::new(BingClient::new(BingClientParams {
                api_key: config.require_api_key("bing")?,
                mode: config.mode.bing_mode().to_string(),
                timeout: config.timeout,
            })?),
        };

        Ok(Router { backend })
    }

    /// Build a router over a local road graph. The graph is owned by the
    /// router and reused across calls.
    pub fn local(graph: RoadGraph) -> Self {
        Router {
            backend: Box::new(LocalBackend::new(graph)),
        }
    }

    /// Wrap any backend. This is how tests plug in deterministic stubs.
    pub fn from_backend(backend: Box<dyn MatrixBackend>) -> Self {
        Router { backend }
    }

    pub fn available_providers() -> &'static [Provider] {
        &[Provider::Osrm, Provider::Google, Provider::Bing]
    }

    /// Single-pair query: duration, distance, raw payload, and the
    /// provider's per-segment geometry when available.
    pub fn get_route<O, D>(&self, origin: O, destination: D) -> Result<RouteSummary, RoutingError>
    where
        O: IntoCoordinate,
        D: IntoCoordinate,
    {
        let origin = origin.into_coordinate()?;
        let destination = destination.into_coordinate()?;

        self.backend.route(origin, destination)
    }

    /// Full cross-product matrix in one backend call: every origin against
    /// every destination, rows in origin-major order. Sizing the request to
    /// the provider's limits is the caller's concern here; use
    /// [`get_distances_batch`](Self::get_distances_batch) for paired bulk
    /// queries.
    pub fn get_distance_matrix<I, J>(
        &self,
        origins: I,
        destinations: J,
        append_od: bool,
    ) -> Result<DistanceTable, RoutingError>
    where
        I: IntoIterator,
        I::Item: IntoCoordinate,
        J: IntoIterator,
        J::Item: IntoCoordinate,
    {
        let origins = normalize_coords(origins)?;
        let destinations = normalize_coords(destinations)?;

        let matrix = self.backend.matrix(&origins, &destinations)?;

        let mut rows = Vec::with_capacity(origins.len() * destinations.len());
        for (i, &origin) in origins.iter().enumerate() {
            for (j, &destination) in destinations.iter().enumerate() {
                rows.push(TableRow {
                    od: append_od.then(|| OdColumns::new(origin, destination)),
                    distance_m: matrix.distance(i, j),
                    duration_s: matrix.duration(i, j),
                });
            }
        }

        Ok(DistanceTable::from_rows(rows))
    }

    /// Paired bulk query: row `i` of the result answers
    /// `origins[i] -> destinations[i]`. Requests are partitioned into
    /// provider-sized batches, dispatched strictly sequentially, and
    /// reassembled in input order. The first failing batch aborts the whole
    /// call; nothing partial is returned.
    ///
    /// `max_batch_size` overrides the provider's own limit; `None` defers
    /// to it.
    pub fn get_distances_batch<I, J>(
        &self,
        origins: I,
        destinations: J,
        append_od: bool,
        max_batch_size: Option<usize>,
    ) -> Result<DistanceTable, RoutingError>
    where
        I: IntoIterator,
        I::Item: IntoCoordinate,
        J: IntoIterator,
        J::Item: IntoCoordinate,
    {
        let origins = normalize_coords(origins)?;
        let destinations = normalize_coords(destinations)?;

        let limit = max_batch_size.or_else(|| self.backend.max_batch_size());
        let batches = build_batches(&origins, &destinations, limit)?;
        let batch_count = batches.len();

        let mut resolved: Vec<(OdBatch, RectMatrix)> = Vec::with_capacity(batch_count);
        for (number, batch) in batches.into_iter().enumerate() {
            debug!(
                batch = number + 1,
                batches = batch_count,
                pairs = batch.len(),
                "dispatching batch"
            );
            let matrix = self.backend.matrix(&batch.origins, &batch.destinations)?;
            resolved.push((batch, matrix));
        }

        assemble(&resolved, origins.len(), append_od)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_requires_api_key() {
        let result = Router::new(Provider::Google, RouterConfig::default());
        assert!(matches!(
            result,
            Err(RoutingError::Validation(ValidationError::MissingApiKey(
                "google"
            )))
        ));
    }

    #[test]
    fn test_osrm_needs_no_api_key() {
        assert!(Router::new(Provider::Osrm, RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_available_providers_is_closed_set() {
        let providers = Router::available_providers();
        assert_eq!(providers.len(), 3);
        assert_eq!(providers[0].to_string(), "osrm");
    }
}
