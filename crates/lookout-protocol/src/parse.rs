//! Incremental reply parser.
//!
//! The caller owns the read buffer. [`parse_frame`] looks at whatever has
//! arrived so far and either hands back one complete frame plus the number
//! of bytes it used, or reports that more data is needed. Nothing in the
//! buffer is consumed on an incomplete read, so the caller can append and
//! try again.

use bytes::Bytes;

use crate::error::ProtocolError;
use crate::types::Frame;

/// Deepest array/map nesting we follow. Status replies are flat; this only
/// guards against a misbehaving peer.
const MAX_DEPTH: usize = 32;

/// Largest bulk payload accepted. `CLUSTER NODES` on a very large cluster
/// is a few megabytes at most.
const MAX_BULK_LEN: usize = 64 * 1024 * 1024;

/// Upper bound on up-front `Vec` reservation for aggregate frames.
const PREALLOC_CAP: usize = 256;

/// Tries to parse one complete frame from the front of `buf`.
///
/// Returns `Ok(Some((frame, consumed)))` on success, `Ok(None)` when the
/// buffer holds only part of a frame, and `Err` when the bytes can never
/// form a valid frame.
pub fn parse_frame(buf: &[u8]) -> Result<Option<(Frame, usize)>, ProtocolError> {
    if buf.is_empty() {
        return Ok(None);
    }

    let mut reader = Reader { buf, pos: 0 };
    match reader.frame(0) {
        Ok(frame) => Ok(Some((frame, reader.pos))),
        Err(ProtocolError::Incomplete) => Ok(None),
        Err(e) => Err(e),
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn frame(&mut self, depth: usize) -> Result<Frame, ProtocolError> {
        let prefix = self.byte()?;
        match prefix {
            b'+' => Ok(Frame::Simple(self.text_line("simple string")?)),
            b'-' => Ok(Frame::Error(self.text_line("error string")?)),
            b':' => Ok(Frame::Integer(self.integer_line()?)),
            b'$' => self.bulk(),
            b'*' => {
                let Some(count) = self.aggregate_len()? else {
                    return Ok(Frame::Null);
                };
                let depth = self.descend(depth)?;
                let mut items = Vec::with_capacity(count.min(PREALLOC_CAP));
                for _ in 0..count {
                    items.push(self.frame(depth)?);
                }
                Ok(Frame::Array(items))
            }
            b'%' => {
                let Some(count) = self.aggregate_len()? else {
                    return Ok(Frame::Null);
                };
                let depth = self.descend(depth)?;
                let mut pairs = Vec::with_capacity(count.min(PREALLOC_CAP));
                for _ in 0..count {
                    let key = self.frame(depth)?;
                    let val = self.frame(depth)?;
                    pairs.push((key, val));
                }
                Ok(Frame::Map(pairs))
            }
            b'_' => {
                self.line()?;
                Ok(Frame::Null)
            }
            other => Err(ProtocolError::InvalidPrefix(other)),
        }
    }

    fn bulk(&mut self) -> Result<Frame, ProtocolError> {
        let len = self.integer_line()?;
        if len == -1 {
            return Ok(Frame::Null);
        }
        if len < 0 {
            return Err(ProtocolError::InvalidFrameLength(len));
        }
        let len = len as usize;
        if len > MAX_BULK_LEN {
            return Err(ProtocolError::BulkTooLarge(len));
        }

        let end = self.pos + len;
        if self.buf.len() < end + 2 {
            return Err(ProtocolError::Incomplete);
        }
        if &self.buf[end..end + 2] != b"\r\n" {
            return Err(ProtocolError::InvalidFrameLength(len as i64));
        }

        let data = Bytes::copy_from_slice(&self.buf[self.pos..end]);
        self.pos = end + 2;
        Ok(Frame::Bulk(data))
    }

    /// Reads an aggregate header. `None` means the RESP2 null form (`-1`).
    fn aggregate_len(&mut self) -> Result<Option<usize>, ProtocolError> {
        let count = self.integer_line()?;
        match count {
            -1 => Ok(None),
            n if n < 0 => Err(ProtocolError::InvalidFrameLength(n)),
            n => Ok(Some(n as usize)),
        }
    }

    fn descend(&self, depth: usize) -> Result<usize, ProtocolError> {
        let next = depth + 1;
        if next > MAX_DEPTH {
            return Err(ProtocolError::NestingTooDeep(MAX_DEPTH));
        }
        Ok(next)
    }

    fn byte(&mut self) -> Result<u8, ProtocolError> {
        let b = *self.buf.get(self.pos).ok_or(ProtocolError::Incomplete)?;
        self.pos += 1;
        Ok(b)
    }

    /// Returns the bytes up to the next CRLF and moves past it.
    fn line(&mut self) -> Result<&'a [u8], ProtocolError> {
        let rest = &self.buf[self.pos..];
        let Some(idx) = rest.windows(2).position(|w| w == b"\r\n") else {
            return Err(ProtocolError::Incomplete);
        };
        self.pos += idx + 2;
        Ok(&rest[..idx])
    }

    fn text_line(&mut self, what: &'static str) -> Result<String, ProtocolError> {
        let line = self.line()?;
        std::str::from_utf8(line)
            .map(str::to_owned)
            .map_err(|_| ProtocolError::InvalidUtf8(what))
    }

    fn integer_line(&mut self) -> Result<i64, ProtocolError> {
        let line = self.line()?;
        std::str::from_utf8(line)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(ProtocolError::InvalidInteger)
    }
}
