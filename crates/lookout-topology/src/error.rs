//! Error types for topology construction.

/// Errors that can occur while building or checking a topology.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// The placement tag did not split into region:zone:room.
    #[error("invalid tag '{0}': expected region:zone:room")]
    InvalidTag(String),

    /// A status line could not be parsed for a reason other than its tag.
    #[error("malformed status line: {0}")]
    MalformedLine(String),

    /// A node id is not part of the topology.
    #[error("node {0} not found in cluster")]
    NodeNotFound(String),

    /// Two seeds disagree about a node's authoritative fields.
    #[error("seeds disagree on node {0}")]
    TopologyMismatch(String),
}

impl TopologyError {
    /// Shorthand for building a `MalformedLine` from anything displayable.
    pub(crate) fn malformed(msg: impl std::fmt::Display) -> Self {
        TopologyError::MalformedLine(msg.to_string())
    }
}
