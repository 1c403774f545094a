use thiserror::Error;

/// Malformed caller input. Never retried, surfaced before any request is
/// issued.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("coordinate must have exactly two components, got {0}")]
    Arity(usize),

    #[error("coordinate components must be finite")]
    NotFinite,

    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeRange(f64),

    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeRange(f64),

    #[error("origins and destinations must have the same length, got {origins} and {destinations}")]
    LengthMismatch { origins: usize, destinations: usize },

    #[error("provider {0} requires an api key")]
    MissingApiKey(&'static str),
}

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The vendor answered, but with a non-success HTTP status or a
    /// domain-level failure. The raw payload is kept for diagnosis.
    #[error("provider error (status {status}): {payload}")]
    Provider { status: u16, payload: String },

    /// Transport-level failure: timeout, DNS, connection reset.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Graph(#[from] georouter_graph::GraphError),
}
