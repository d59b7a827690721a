//! In-memory status client for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;

use lookout_client::{ClientError, InfoSection, StatusClient};
use tokio::sync::Notify;

/// A scripted cluster: each address has a membership listing, a
/// replication section, or nothing at all.
#[derive(Default)]
pub(crate) struct MockClient {
    views: Mutex<HashMap<String, String>>,
    replication: Mutex<HashMap<String, InfoSection>>,
    dead: Mutex<HashSet<String>>,
    /// Addresses whose calls never complete.
    hung: Mutex<HashSet<String>>,
    /// Membership fetches to these addresses wait for a notification.
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    membership_calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn set_view(&self, addr: &str, text: impl Into<String>) {
        self.views.lock().unwrap().insert(addr.into(), text.into());
    }

    pub fn set_master_offset(&self, addr: &str, offset: i64) {
        self.set_info(
            addr,
            [("role", "master".to_string()), ("master_repl_offset", offset.to_string())],
        );
    }

    pub fn set_slave_offset(&self, addr: &str, offset: i64) {
        self.set_info(
            addr,
            [("role", "slave".to_string()), ("slave_repl_offset", offset.to_string())],
        );
    }

    pub fn set_info<const N: usize>(&self, addr: &str, fields: [(&str, String); N]) {
        let info: InfoSection = fields.into_iter().collect();
        self.replication.lock().unwrap().insert(addr.into(), info);
    }

    pub fn kill(&self, addr: &str) {
        self.dead.lock().unwrap().insert(addr.into());
    }

    pub fn hang(&self, addr: &str) {
        self.hung.lock().unwrap().insert(addr.into());
    }

    /// Holds membership fetches to `addr` until the returned handle is
    /// notified.
    pub fn gate(&self, addr: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(addr.into(), Arc::clone(&notify));
        notify
    }

    /// Addresses membership was fetched from, in call order.
    pub fn membership_calls(&self) -> Vec<String> {
        self.membership_calls.lock().unwrap().clone()
    }

    fn is_dead(&self, addr: &str) -> bool {
        self.dead.lock().unwrap().contains(addr)
    }

    async fn maybe_hang(&self, addr: &str) {
        let hung = self.hung.lock().unwrap().contains(addr);
        if hung {
            std::future::pending::<()>().await;
        }
    }

    fn refused() -> ClientError {
        ClientError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }
}

impl StatusClient for MockClient {
    async fn is_alive(&self, addr: &str) -> bool {
        self.maybe_hang(addr).await;
        !self.is_dead(addr) && self.views.lock().unwrap().contains_key(addr)
    }

    async fn fetch_membership(&self, addr: &str) -> Result<String, ClientError> {
        self.membership_calls.lock().unwrap().push(addr.into());
        self.maybe_hang(addr).await;
        let gate = self.gates.lock().unwrap().get(addr).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.is_dead(addr) {
            return Err(Self::refused());
        }
        self.views
            .lock()
            .unwrap()
            .get(addr)
            .cloned()
            .ok_or_else(Self::refused)
    }

    async fn fetch_replication_info(&self, addr: &str) -> Result<InfoSection, ClientError> {
        self.maybe_hang(addr).await;
        if self.is_dead(addr) {
            return Err(Self::refused());
        }
        self.replication
            .lock()
            .unwrap()
            .get(addr)
            .cloned()
            .ok_or_else(Self::refused)
    }
}

/// Formats a status line the way a seed would report it.
pub(crate) fn line(id: &str, addr: &str, region: &str, flags: &str, parent: &str, slots: &str) -> String {
    let mode = if flags.contains("master") { "rw" } else { "r-" };
    format!("{mode} {region}:z1:r1 {id} {addr} {flags} {parent} 0 0 1 connected {slots}")
        .trim_end()
        .to_string()
}
