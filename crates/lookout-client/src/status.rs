//! The status-query contract and its RESP implementation.

use std::future::Future;

use tracing::debug;

use crate::{ClientError, Connection, InfoSection};

/// The three queries lookout issues against a node.
///
/// Implementations must be cheap to share: the engine holds one behind
/// an `Arc` and calls it from many tasks at once.
pub trait StatusClient: Send + Sync + 'static {
    /// Returns true if the node at `addr` answers a liveness probe.
    fn is_alive(&self, addr: &str) -> impl Future<Output = bool> + Send;

    /// Returns the node's raw membership listing, one node per line.
    fn fetch_membership(
        &self,
        addr: &str,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;

    /// Returns the node's replication fields (`role`,
    /// `master_repl_offset`, `slave_repl_offset`, ...).
    fn fetch_replication_info(
        &self,
        addr: &str,
    ) -> impl Future<Output = Result<InfoSection, ClientError>> + Send;
}

/// [`StatusClient`] over TCP, one connection per query.
///
/// Uses `PING`, `CLUSTER NODES` and `INFO replication`. When a password
/// is configured every connection authenticates first.
#[derive(Debug, Clone, Default)]
pub struct RespStatusClient {
    password: Option<String>,
}

impl RespStatusClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate every connection with `password`.
    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
        }
    }

    async fn open(&self, addr: &str) -> Result<Connection, ClientError> {
        let mut conn = Connection::connect(addr).await?;
        if let Some(ref pw) = self.password {
            conn.authenticate(pw).await?;
        }
        Ok(conn)
    }

    async fn ping(&self, addr: &str) -> Result<bool, ClientError> {
        let mut conn = self.open(addr).await?;
        let reply = conn.send_command(&["PING"]).await?;
        Ok(reply.as_text().is_some_and(|s| s.eq_ignore_ascii_case("PONG")))
    }
}

impl StatusClient for RespStatusClient {
    async fn is_alive(&self, addr: &str) -> bool {
        match self.ping(addr).await {
            Ok(alive) => alive,
            Err(e) => {
                debug!(addr, "liveness probe failed: {e}");
                false
            }
        }
    }

    async fn fetch_membership(&self, addr: &str) -> Result<String, ClientError> {
        let mut conn = self.open(addr).await?;
        conn.text_command("CLUSTER NODES", &["CLUSTER", "NODES"])
            .await
    }

    async fn fetch_replication_info(&self, addr: &str) -> Result<InfoSection, ClientError> {
        let mut conn = self.open(addr).await?;
        let text = conn
            .text_command("INFO replication", &["INFO", "replication"])
            .await?;
        Ok(InfoSection::parse(&text))
    }
}
