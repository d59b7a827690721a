//! lookout-protocol: the slice of RESP that lookout needs to poll nodes.
//!
//! Requests go out as arrays of bulk strings; replies come back as any
//! RESP2 or RESP3 value a node might answer a status command with.
//!
//! ```
//! use bytes::BytesMut;
//! use lookout_protocol::{encode_command, parse_frame, Frame};
//!
//! let mut buf = BytesMut::new();
//! encode_command(&["PING"], &mut buf);
//! assert_eq!(&buf[..], b"*1\r\n$4\r\nPING\r\n");
//!
//! let (frame, consumed) = parse_frame(b"+PONG\r\n").unwrap().unwrap();
//! assert_eq!(frame, Frame::Simple("PONG".into()));
//! assert_eq!(consumed, 7);
//! ```

pub mod error;
pub mod parse;
mod serialize;
pub mod types;

pub use error::ProtocolError;
pub use parse::parse_frame;
pub use serialize::encode_command;
pub use types::Frame;
