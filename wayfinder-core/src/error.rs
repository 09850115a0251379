use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Fatal graph build failures. Problems with single map entities are
/// logged and skipped instead.
#[derive(Error, Debug, PartialEq)]
pub enum BuildError {
    #[error("Map data yields no routable nodes")]
    EmptyGraph,
    #[error("Invalid map data: {0}")]
    InvalidMapData(String),
    #[error("Unsupported snapshot schema version {found} (expected {expected})")]
    UnsupportedSnapshot { found: u32, expected: u32 },
    #[error("Map v{version} is older than the live map v{live}")]
    StaleMap { version: u64, live: u64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("Routing is not available yet: {0}")]
    NotYetRoutable(String),
    #[error("Location is unreachable: {0}")]
    LocationUnreachable(String),
    #[error("No route found: {0}")]
    NoRouteFound(String),
    #[error("Route search was cancelled")]
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionsError {
    #[error("Invalid route options: {0}")]
    InvalidRouteOptions(String),
}

impl OptionsError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        OptionsError::InvalidRouteOptions(reason.into())
    }
}
