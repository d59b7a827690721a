//! One TCP connection to a cluster node.
//!
//! Sends commands as arrays of bulk strings and reads back parsed
//! frames. Connections are cheap and short-lived: the status client
//! opens one per query.

use bytes::BytesMut;
use lookout_protocol::{encode_command, parse_frame, Frame};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::ClientError;

/// A TCP connection to a node with read/write buffering.
pub struct Connection {
    stream: TcpStream,
    read_buf: BytesMut,
    write_buf: BytesMut,
}

impl Connection {
    /// Connects to `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            read_buf: BytesMut::with_capacity(4096),
            write_buf: BytesMut::with_capacity(256),
        })
    }

    /// Sends a command and reads the reply.
    pub async fn send_command(&mut self, args: &[&str]) -> Result<Frame, ClientError> {
        self.write_buf.clear();
        encode_command(args, &mut self.write_buf);
        self.stream.write_all(&self.write_buf).await?;
        self.stream.flush().await?;

        self.read_reply().await
    }

    /// Authenticates with `AUTH <password>`.
    pub async fn authenticate(&mut self, password: &str) -> Result<(), ClientError> {
        match self.send_command(&["AUTH", password]).await? {
            Frame::Simple(s) if s == "OK" => Ok(()),
            Frame::Error(e) => Err(ClientError::AuthFailed(e)),
            other => Err(ClientError::AuthFailed(format!(
                "unexpected response to AUTH: {other:?}"
            ))),
        }
    }

    /// Sends a command whose reply must be text, e.g. `CLUSTER NODES`.
    pub async fn text_command(
        &mut self,
        command: &'static str,
        args: &[&str],
    ) -> Result<String, ClientError> {
        let reply = self.send_command(args).await?;
        match reply {
            Frame::Error(e) => Err(ClientError::Server(e)),
            ref frame => frame.as_text().ok_or_else(|| ClientError::UnexpectedReply {
                command,
                reply: format!("{frame:?}"),
            }),
        }
    }

    async fn read_reply(&mut self) -> Result<Frame, ClientError> {
        loop {
            if let Some((frame, consumed)) = parse_frame(&self.read_buf)? {
                let _ = self.read_buf.split_to(consumed);
                return Ok(frame);
            }

            let n = self.stream.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                return Err(ClientError::Disconnected);
            }
        }
    }
}
