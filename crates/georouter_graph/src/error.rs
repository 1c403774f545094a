use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("node {0} does not exist")]
    InvalidNode(usize),

    #[error("edge speed must be positive, got {0} km/h")]
    InvalidSpeed(f64),

    #[error("edge length must be non-negative and finite, got {0} m")]
    InvalidLength(f64),
}
