//! Error types for the router.

use thiserror::Error;

/// Result type alias for the router.
pub type Result<T> = std::result::Result<T, RouterError>;

/// Errors surfaced by membership changes and configuration.
///
/// Routing itself never fails: an empty cluster is reported as `None`.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The node factory could not build a node; it was added to neither the
    /// node set nor the ring.
    #[error("failed to create node {name} from {url}")]
    NodeFactory {
        name: String,
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Ring(#[from] corelib::Error),

    #[error("invalid router configuration: {0}")]
    Config(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}
