use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::backend::{MatrixBackend, RouteSegment, RouteSummary};
use crate::coords::Coordinate;
use crate::error::RoutingError;
use crate::matrix::RectMatrix;
use crate::providers::{get_json, vendor_failure};
use crate::units::{DistanceUnit, DurationUnit};

pub const BING_MATRIX_URL: &str = "https://dev.virtualearth.net/REST/v1/Routes/DistanceMatrix";
pub const BING_ROUTES_URL: &str = "https://dev.virtualearth.net/REST/v1/Routes";

pub struct BingClientParams {
    pub api_key: String,
    pub mode: String,
    pub timeout: Duration,
}

/// Client for the Bing Maps routes and distance-matrix APIs. Bing reports
/// distances and durations in whatever units the resource declares
/// (`"Mile"`, `"Minute"`, ...), so every value is converted to meters and
/// seconds before it reaches a matrix cell.
pub struct BingClient {
    params: BingClientParams,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<R> {
    status_description: String,
    resource_sets: Vec<ResourceSet<R>>,
}

#[derive(Deserialize)]
struct ResourceSet<R> {
    resources: Vec<R>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatrixResource {
    results: Vec<MatrixCell>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatrixCell {
    origin_index: usize,
    destination_index: usize,
    travel_distance: f64,
    travel_duration: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteResource {
    travel_distance: f64,
    travel_duration: f64,
    distance_unit: Option<String>,
    duration_unit: Option<String>,
    #[serde(default)]
    route_legs: Vec<RouteLeg>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteLeg {
    travel_distance: f64,
    travel_duration: f64,
}

fn parse_distance_unit(name: Option<&str>) -> Result<DistanceUnit, RoutingError> {
    match name {
        // Bing's route resources default to kilometers
        None => Ok(DistanceUnit::Kilometer),
        Some(name) => DistanceUnit::from_vendor(name).ok_or_else(|| {
            RoutingError::MalformedResponse(format!("unknown distance unit {name:?}"))
        }),
    }
}

fn parse_duration_unit(name: Option<&str>) -> Result<DurationUnit, RoutingError> {
    match name {
        None => Ok(DurationUnit::Second),
        Some(name) => DurationUnit::from_vendor(name).ok_or_else(|| {
            RoutingError::MalformedResponse(format!("unknown duration unit {name:?}"))
        }),
    }
}

impl BingClient {
    pub fn new(params: BingClientParams) -> Result<Self, RoutingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(params.timeout)
            .build()?;

        Ok(BingClient { params, client })
    }

    fn semicolon_separated(coords: &[Coordinate]) -> String {
        coords
            .iter()
            .map(|c| format!("{},{}", c.lat(), c.lon()))
            .collect::<Vec<_>>()
            .join(";")
    }

    fn first_resource<R>(raw: &serde_json::Value) -> Result<R, RoutingError>
    where
        R: serde::de::DeserializeOwned,
    {
        let envelope: Envelope<R> = serde_json::from_value(raw.clone())
            .map_err(|err| RoutingError::MalformedResponse(err.to_string()))?;
        if envelope.status_description != "OK" {
            return Err(vendor_failure(raw));
        }

        envelope
            .resource_sets
            .into_iter()
            .next()
            .and_then(|set| set.resources.into_iter().next())
            .ok_or_else(|| RoutingError::MalformedResponse("empty resource set".to_string()))
    }
}

impl MatrixBackend for BingClient {
    fn matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<RectMatrix, RoutingError> {
        // pin the units so the response is unambiguous
        let query = [
            ("origins", Self::semicolon_separated(origins)),
            ("destinations", Self::semicolon_separated(destinations)),
            ("travelMode", self.params.mode.clone()),
            ("distanceUnit", "kilometer".to_string()),
            ("timeUnit", "second".to_string()),
            ("key", self.params.api_key.clone()),
        ];

        debug!(
            origins = origins.len(),
            destinations = destinations.len(),
            "bing: requesting distance matrix"
        );
        let raw = get_json(&self.client, BING_MATRIX_URL, &query)?;
        let resource: MatrixResource = Self::first_resource(&raw)?;

        let cells = origins.len() * destinations.len();
        let mut durations: Vec<Option<f64>> = vec![None; cells];
        let mut distances: Vec<Option<f64>> = vec![None; cells];

        for cell in resource.results {
            if cell.origin_index >= origins.len() || cell.destination_index >= destinations.len() {
                return Err(RoutingError::MalformedResponse(format!(
                    "cell ({}, {}) outside the {}x{} matrix",
                    cell.origin_index,
                    cell.destination_index,
                    origins.len(),
                    destinations.len()
                )));
            }

            // negative values mark unroutable pairs
            if cell.travel_distance < 0.0 || cell.travel_duration < 0.0 {
                continue;
            }

            let index = cell.origin_index * destinations.len() + cell.destination_index;
            durations[index] = Some(DurationUnit::Second.to_seconds(cell.travel_duration));
            distances[index] = Some(DistanceUnit::Kilometer.to_meters(cell.travel_distance));
        }

        RectMatrix::new(origins.to_vec(), destinations.to_vec(), durations, distances)
    }

    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, RoutingError> {
        let query = [
            ("wp.0", format!("{},{}", origin.lat(), origin.lon())),
            ("wp.1", format!("{},{}", destination.lat(), destination.lon())),
            ("travelMode", self.params.mode.clone()),
            ("key", self.params.api_key.clone()),
        ];

        let raw = get_json(&self.client, BING_ROUTES_URL, &query)?;
        let resource: RouteResource = Self::first_resource(&raw)?;

        let distance_unit = parse_distance_unit(resource.distance_unit.as_deref())?;
        let duration_unit = parse_duration_unit(resource.duration_unit.as_deref())?;

        let segments = resource
            .route_legs
            .iter()
            .map(|leg| {
                RouteSegment::new(
                    distance_unit.to_meters(leg.travel_distance),
                    duration_unit.to_seconds(leg.travel_duration),
                )
            })
            .collect();

        Ok(RouteSummary {
            duration_s: Some(duration_unit.to_seconds(resource.travel_duration)),
            distance_m: Some(distance_unit.to_meters(resource.travel_distance)),
            raw,
            segments,
        })
    }

    fn max_batch_size(&self) -> Option<usize> {
        // distance matrix requests are capped at 2500 origin-destination cells
        Some(2500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route_envelope(resource: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "statusCode": 200,
            "statusDescription": "OK",
            "resourceSets": [{"resources": [resource]}]
        })
    }

    #[test]
    fn test_route_units_converted() {
        let raw = route_envelope(serde_json::json!({
            "travelDistance": 5.0,
            "travelDuration": 2.0,
            "distanceUnit": "Mile",
            "durationUnit": "Minute",
        }));

        let resource: RouteResource = BingClient::first_resource(&raw).unwrap();
        let distance_unit = parse_distance_unit(resource.distance_unit.as_deref()).unwrap();
        let duration_unit = parse_duration_unit(resource.duration_unit.as_deref()).unwrap();

        assert_eq!(duration_unit.to_seconds(resource.travel_duration), 120.0);
        assert!((distance_unit.to_meters(resource.travel_distance) - 8046.72).abs() < 0.01);
    }

    #[test]
    fn test_vendor_failure_surfaces_payload() {
        let raw = serde_json::json!({
            "statusCode": 401,
            "statusDescription": "Unauthorized",
            "resourceSets": []
        });

        let result: Result<RouteResource, _> = BingClient::first_resource(&raw);
        match result {
            Err(RoutingError::Provider { status: 200, payload }) => {
                assert!(payload.contains("Unauthorized"));
            }
            _ => panic!("expected provider error"),
        }
    }

    #[test]
    fn test_matrix_cell_indices() {
        let raw = route_envelope(serde_json::json!({
            "results": [
                {"originIndex": 0, "destinationIndex": 0, "travelDistance": 1.5, "travelDuration": 90.0},
                {"originIndex": 0, "destinationIndex": 1, "travelDistance": -1.0, "travelDuration": -1.0},
            ]
        }));

        let resource: MatrixResource = BingClient::first_resource(&raw).unwrap();
        assert_eq!(resource.results.len(), 2);
        assert_eq!(resource.results[0].travel_distance, 1.5);
    }
}
