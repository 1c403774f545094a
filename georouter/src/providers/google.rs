use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::backend::{MatrixBackend, RouteSummary};
use crate::coords::Coordinate;
use crate::error::RoutingError;
use crate::matrix::RectMatrix;
use crate::providers::{get_json, vendor_failure};

pub const GOOGLE_DISTANCE_MATRIX_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

pub struct GoogleClientParams {
    pub api_key: String,
    pub mode: String,
    pub language: String,
    pub timeout: Duration,
}

/// Client for the Google Distance Matrix API. Reports meters and seconds
/// natively; per-element failures (`ZERO_RESULTS`, `NOT_FOUND`) become null
/// cells instead of aborting the batch.
pub struct GoogleClient {
    params: GoogleClientParams,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Deserialize)]
struct MatrixElement {
    status: String,
    duration: Option<ValueField>,
    distance: Option<ValueField>,
}

#[derive(Deserialize)]
struct ValueField {
    value: f64,
}

impl GoogleClient {
    pub fn new(params: GoogleClientParams) -> Result<Self, RoutingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(params.timeout)
            .build()?;

        Ok(GoogleClient { params, client })
    }

    fn pipe_separated(coords: &[Coordinate]) -> String {
        coords
            .iter()
            .map(|c| format!("{},{}", c.lat(), c.lon()))
            .collect::<Vec<_>>()
            .join("|")
    }

    fn fetch(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<(serde_json::Value, MatrixResponse), RoutingError> {
        let query = [
            ("origins", Self::pipe_separated(origins)),
            ("destinations", Self::pipe_separated(destinations)),
            ("mode", self.params.mode.clone()),
            ("language", self.params.language.clone()),
            ("key", self.params.api_key.clone()),
        ];

        debug!(
            origins = origins.len(),
            destinations = destinations.len(),
            "google: requesting distance matrix"
        );
        let raw = get_json(&self.client, GOOGLE_DISTANCE_MATRIX_URL, &query)?;

        let response: MatrixResponse = serde_json::from_value(raw.clone())
            .map_err(|err| RoutingError::MalformedResponse(err.to_string()))?;
        if response.status != "OK" {
            return Err(vendor_failure(&raw));
        }

        Ok((raw, response))
    }
}

impl MatrixBackend for GoogleClient {
    fn matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<RectMatrix, RoutingError> {
        let (_, response) = self.fetch(origins, destinations)?;

        if response.rows.len() != origins.len()
            || response
                .rows
                .iter()
                .any(|row| row.elements.len() != destinations.len())
        {
            return Err(RoutingError::MalformedResponse(format!(
                "expected a {}x{} element grid",
                origins.len(),
                destinations.len()
            )));
        }

        let mut durations = Vec::with_capacity(origins.len() * destinations.len());
        let mut distances = Vec::with_capacity(origins.len() * destinations.len());
        for row in &response.rows {
            for element in &row.elements {
                if element.status == "OK" {
                    durations.push(element.duration.as_ref().map(|d| d.value));
                    distances.push(element.distance.as_ref().map(|d| d.value));
                } else {
                    durations.push(None);
                    distances.push(None);
                }
            }
        }

        RectMatrix::new(origins.to_vec(), destinations.to_vec(), durations, distances)
    }

    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, RoutingError> {
        // a 1x1 distance matrix answers the single-pair question
        let (raw, response) = self.fetch(&[origin], &[destination])?;

        let element = response
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .ok_or_else(|| RoutingError::MalformedResponse("empty element grid".to_string()))?;

        let (duration_s, distance_m) = if element.status == "OK" {
            (
                element.duration.as_ref().map(|d| d.value),
                element.distance.as_ref().map(|d| d.value),
            )
        } else {
            (None, None)
        };

        Ok(RouteSummary {
            duration_s,
            distance_m,
            raw,
            segments: Vec::new(),
        })
    }

    fn max_batch_size(&self) -> Option<usize> {
        // the distance matrix API caps a request at 100 elements AND 25
        // origins / 25 destinations; the varying side of a batch must stay
        // within the tighter per-axis bound
        Some(25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_separated_is_lat_lon() {
        let a = Coordinate::new(42.0, -71.0).unwrap();
        let b = Coordinate::new(43.5, -72.5).unwrap();
        assert_eq!(GoogleClient::pipe_separated(&[a, b]), "42,-71|43.5,-72.5");
    }

    #[test]
    fn test_default_limit_respects_per_axis_caps() {
        let client = GoogleClient::new(GoogleClientParams {
            api_key: "test-key".to_string(),
            mode: "driving".to_string(),
            language: "en".to_string(),
            timeout: Duration::from_secs(10),
        })
        .unwrap();

        let limit = client.max_batch_size().unwrap();

        // batches carry one fixed coordinate and up to `limit` varying ones,
        // so `limit` bounds the wider axis and the 1 x limit element count
        assert!(limit <= 25);
        assert!(limit <= 100);
    }

    #[test]
    fn test_element_grid_parses() {
        let raw = serde_json::json!({
            "status": "OK",
            "rows": [{
                "elements": [
                    {"status": "OK", "duration": {"value": 120.0}, "distance": {"value": 1500.0}},
                    {"status": "ZERO_RESULTS"}
                ]
            }]
        });

        let response: MatrixResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.rows[0].elements[0].duration.as_ref().unwrap().value, 120.0);
        assert_eq!(response.rows[0].elements[1].status, "ZERO_RESULTS");
        assert!(response.rows[0].elements[1].duration.is_none());
    }
}
