//! Errors surfaced by the status client.

/// Errors that can occur while querying a node.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] lookout_protocol::ProtocolError),

    #[error("server disconnected")]
    Disconnected,

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The node answered with an error reply.
    #[error("server error: {0}")]
    Server(String),

    /// The reply had the wrong shape for the command sent.
    #[error("unexpected reply to {command}: {reply}")]
    UnexpectedReply { command: &'static str, reply: String },

    /// A field the caller needs is absent from an INFO section.
    #[error("missing field '{0}'")]
    MissingField(String),

    /// An INFO field that should be an integer is not.
    #[error("field '{field}' is not an integer: '{value}'")]
    InvalidInteger { field: String, value: String },
}
