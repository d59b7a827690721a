//! Request and frame encoding.
//!
//! Writes straight into a `BytesMut` with no intermediate allocations.

use bytes::{BufMut, BytesMut};

use crate::types::Frame;

/// Encodes a command as an array of bulk strings, the form every node
/// accepts regardless of protocol version.
pub fn encode_command<S: AsRef<str>>(args: &[S], dst: &mut BytesMut) {
    dst.put_u8(b'*');
    write_len(args.len(), dst);
    for arg in args {
        let arg = arg.as_ref().as_bytes();
        dst.put_u8(b'$');
        write_len(arg.len(), dst);
        dst.put_slice(arg);
        dst.put_slice(b"\r\n");
    }
}

impl Frame {
    /// Serializes this frame in RESP3 form.
    ///
    /// lookout itself only sends commands; this is what test harnesses use
    /// to play the node side of a conversation.
    pub fn serialize(&self, dst: &mut BytesMut) {
        match self {
            Frame::Simple(s) => {
                dst.put_u8(b'+');
                dst.put_slice(s.as_bytes());
                dst.put_slice(b"\r\n");
            }
            Frame::Error(msg) => {
                dst.put_u8(b'-');
                dst.put_slice(msg.as_bytes());
                dst.put_slice(b"\r\n");
            }
            Frame::Integer(n) => {
                dst.put_u8(b':');
                let mut buf = itoa::Buffer::new();
                dst.put_slice(buf.format(*n).as_bytes());
                dst.put_slice(b"\r\n");
            }
            Frame::Bulk(data) => {
                dst.put_u8(b'$');
                write_len(data.len(), dst);
                dst.put_slice(data);
                dst.put_slice(b"\r\n");
            }
            Frame::Array(items) => {
                dst.put_u8(b'*');
                write_len(items.len(), dst);
                for item in items {
                    item.serialize(dst);
                }
            }
            Frame::Null => dst.put_slice(b"_\r\n"),
            Frame::Map(pairs) => {
                dst.put_u8(b'%');
                write_len(pairs.len(), dst);
                for (key, val) in pairs {
                    key.serialize(dst);
                    val.serialize(dst);
                }
            }
        }
    }
}

/// Writes a length followed by CRLF.
fn write_len(len: usize, dst: &mut BytesMut) {
    let mut buf = itoa::Buffer::new();
    dst.put_slice(buf.format(len).as_bytes());
    dst.put_slice(b"\r\n");
}
