use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::backend::{MatrixBackend, RouteSegment, RouteSummary};
use crate::coords::Coordinate;
use crate::error::RoutingError;
use crate::matrix::RectMatrix;
use crate::providers::{get_json, vendor_failure};

pub const OSRM_PUBLIC_URL: &str = "https://router.project-osrm.org";

/// The public server's `max-table-size`: a cap on origins + destinations
/// combined in one table request, not on pairs.
const OSRM_MAX_TABLE_LOCATIONS: usize = 100;

pub struct OsrmClientParams {
    pub base_url: String,
    pub profile: String,
    pub timeout: Duration,
}

/// Client for OSRM's `table` and `route` services. Works against the public
/// demo server or any self-hosted instance via `base_url`. OSRM reports
/// seconds and meters natively, so no unit conversion happens here.
pub struct OsrmClient {
    params: OsrmClientParams,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct TableResponse {
    code: String,
    durations: Option<Vec<Vec<Option<f64>>>>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    duration: f64,
    distance: f64,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Deserialize)]
struct OsrmLeg {
    duration: f64,
    distance: f64,
}

impl OsrmClient {
    pub fn new(params: OsrmClientParams) -> Result<Self, RoutingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(params.timeout)
            .build()?;

        Ok(OsrmClient { params, client })
    }

    fn coordinate_path(coords: &[Coordinate]) -> String {
        coords
            .iter()
            .map(|c| format!("{},{}", c.lon(), c.lat()))
            .collect::<Vec<_>>()
            .join(";")
    }

    fn index_list(range: std::ops::Range<usize>) -> String {
        range
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    fn flatten_cells(
        rows: Option<Vec<Vec<Option<f64>>>>,
        expected_rows: usize,
        expected_cols: usize,
        what: &str,
    ) -> Result<Vec<Option<f64>>, RoutingError> {
        let rows = rows.ok_or_else(|| {
            RoutingError::MalformedResponse(format!("table response is missing {what}"))
        })?;

        if rows.len() != expected_rows || rows.iter().any(|row| row.len() != expected_cols) {
            return Err(RoutingError::MalformedResponse(format!(
                "{what} is not a {expected_rows}x{expected_cols} matrix"
            )));
        }

        Ok(rows.into_iter().flatten().collect())
    }
}

impl MatrixBackend for OsrmClient {
    fn matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<RectMatrix, RoutingError> {
        // one combined coordinate list; sources index the front, destinations the back
        let mut coords = origins.to_vec();
        coords.extend_from_slice(destinations);

        let url = format!(
            "{}/table/v1/{}/{}",
            self.params.base_url,
            self.params.profile,
            Self::coordinate_path(&coords)
        );
        let query = [
            ("sources", Self::index_list(0..origins.len())),
            (
                "destinations",
                Self::index_list(origins.len()..coords.len()),
            ),
            ("annotations", "duration,distance".to_string()),
        ];

        debug!(
            origins = origins.len(),
            destinations = destinations.len(),
            "osrm: requesting table"
        );
        let raw = get_json(&self.client, &url, &query)?;

        let response: TableResponse = serde_json::from_value(raw.clone())
            .map_err(|err| RoutingError::MalformedResponse(err.to_string()))?;
        if response.code != "Ok" {
            return Err(vendor_failure(&raw));
        }

        let durations = Self::flatten_cells(
            response.durations,
            origins.len(),
            destinations.len(),
            "durations",
        )?;
        let distances = Self::flatten_cells(
            response.distances,
            origins.len(),
            destinations.len(),
            "distances",
        )?;

        RectMatrix::new(origins.to_vec(), destinations.to_vec(), durations, distances)
    }

    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, RoutingError> {
        let url = format!(
            "{}/route/v1/{}/{}",
            self.params.base_url,
            self.params.profile,
            Self::coordinate_path(&[origin, destination])
        );
        let query = [("overview", "false".to_string())];

        let raw = get_json(&self.client, &url, &query)?;

        let response: RouteResponse = serde_json::from_value(raw.clone())
            .map_err(|err| RoutingError::MalformedResponse(err.to_string()))?;
        if response.code != "Ok" {
            return Err(vendor_failure(&raw));
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::MalformedResponse("no routes in response".to_string()))?;

        Ok(RouteSummary {
            duration_s: Some(route.duration),
            distance_m: Some(route.distance),
            raw,
            segments: route
                .legs
                .iter()
                .map(|leg| RouteSegment::new(leg.distance, leg.duration))
                .collect(),
        })
    }

    fn max_batch_size(&self) -> Option<usize> {
        // a batch of N pairs puts N varying coordinates plus the one fixed
        // coordinate in the table URL, so the pair limit leaves one slot free
        Some(OSRM_MAX_TABLE_LOCATIONS - 1)
    }
}
