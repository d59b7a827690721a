//! Errors raised while decoding replies.

use thiserror::Error;

/// Errors that can occur when parsing a reply off the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The buffer ends before the frame does. Read more and retry.
    #[error("incomplete frame: need more data")]
    Incomplete,

    /// The first byte of a frame is not a known type prefix.
    #[error("invalid type prefix: {0:#04x}")]
    InvalidPrefix(u8),

    /// A length or integer line did not hold a decimal number.
    #[error("invalid integer encoding")]
    InvalidInteger,

    /// A declared length was negative (other than the null marker) or
    /// the payload was not terminated by CRLF.
    #[error("invalid frame length: {0}")]
    InvalidFrameLength(i64),

    /// A line-based frame contained bytes that are not UTF-8.
    #[error("invalid utf-8 in {0}")]
    InvalidUtf8(&'static str),

    /// Arrays and maps nested deeper than we are willing to follow.
    #[error("frame nesting exceeds {0} levels")]
    NestingTooDeep(usize),

    /// A bulk payload larger than any status reply should be.
    #[error("bulk string of {0} bytes exceeds the limit")]
    BulkTooLarge(usize),
}
