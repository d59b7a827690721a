//! Error types for reconciliation and replica queries.

use std::time::Duration;

use lookout_client::ClientError;
use lookout_topology::TopologyError;

/// Errors that can occur during a reconciliation pass or a read query.
#[derive(Debug, thiserror::Error)]
pub enum SpectatorError {
    /// No seed is configured, or none answered a liveness probe.
    #[error("no seed node available")]
    NoSeedAvailable,

    /// A seed's listing could not be parsed or disagreed with another seed.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// A node query failed at the transport or protocol level.
    #[error("node query failed: {0}")]
    Client(#[from] ClientError),

    /// A node query did not finish within the per-call timeout.
    #[error("{op} on {addr} timed out after {after:?}")]
    Timeout {
        op: &'static str,
        addr: String,
        after: Duration,
    },
}

impl SpectatorError {
    /// Returns true if the error came from seeds disagreeing with each
    /// other rather than from a single unreachable or malformed seed.
    pub fn is_inconsistency(&self) -> bool {
        matches!(
            self,
            SpectatorError::Topology(
                TopologyError::NodeNotFound(_) | TopologyError::TopologyMismatch(_)
            )
        )
    }
}
