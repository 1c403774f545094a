//! Vendor adapters. Each one builds the vendor's request shape, issues a
//! single blocking call, and normalizes the response into
//! [`RectMatrix`](crate::matrix::RectMatrix) or
//! [`RouteSummary`](crate::backend::RouteSummary) values in meters and
//! seconds.

pub mod bing;
pub mod google;
pub mod osrm;

pub use bing::BingClient;
pub use google::GoogleClient;
pub use osrm::OsrmClient;

use crate::error::RoutingError;

/// Issue one GET and decode the body. Non-2xx statuses surface as provider
/// errors carrying the raw payload; transport failures surface as network
/// errors through the `reqwest::Error` conversion.
pub(crate) fn get_json(
    client: &reqwest::blocking::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<serde_json::Value, RoutingError> {
    let response = client.get(url).query(query).send()?;

    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        return Err(RoutingError::Provider {
            status: status.as_u16(),
            payload: body,
        });
    }

    serde_json::from_str(&body).map_err(|err| RoutingError::MalformedResponse(err.to_string()))
}

/// Vendor-level failure reported inside a 2xx response.
pub(crate) fn vendor_failure(raw: &serde_json::Value) -> RoutingError {
    RoutingError::Provider {
        status: 200,
        payload: raw.to_string(),
    }
}
