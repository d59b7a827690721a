//! Reply frame types.

use bytes::Bytes;

/// One decoded reply value.
///
/// RESP2 null bulk strings and null arrays (`$-1`, `*-1`) both decode
/// to [`Frame::Null`], the same as the RESP3 `_` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Status reply, e.g. `+PONG\r\n`.
    Simple(String),

    /// Error reply, e.g. `-NOAUTH Authentication required.\r\n`.
    Error(String),

    /// Signed integer, e.g. `:42\r\n`.
    Integer(i64),

    /// Binary-safe payload, e.g. the text body of `CLUSTER NODES`.
    Bulk(Bytes),

    /// Ordered list of frames.
    Array(Vec<Frame>),

    /// Absent value.
    Null,

    /// Key-value pairs in wire order (RESP3 `%`).
    Map(Vec<(Frame, Frame)>),
}

impl Frame {
    /// Returns `true` if this frame is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Frame::Null)
    }

    /// Returns the textual payload of a simple or bulk frame.
    ///
    /// Bulk payloads that are not valid UTF-8 are converted lossily; node
    /// status output is plain ASCII in practice.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Frame::Simple(s) => Some(s.clone()),
            Frame::Bulk(b) => Some(String::from_utf8_lossy(b).into_owned()),
            _ => None,
        }
    }
}
