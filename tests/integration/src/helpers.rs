//! In-process fake cluster nodes for driving lookout end to end.
//!
//! Each [`FakeNode`] listens on `127.0.0.1:0` and answers the handful of
//! commands lookout sends (`AUTH`, `PING`, `CLUSTER NODES`, `INFO`) from
//! state the test can change at any time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use lookout_client::RespStatusClient;
use lookout_protocol::{parse_frame, Frame};
use lookout_spectator::{Spectator, SpectatorConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Default)]
struct NodeState {
    membership: String,
    role: &'static str,
    offset: i64,
    password: Option<String>,
    /// Answer `PING` with an error instead of `PONG`.
    loading: bool,
    /// Accept connections but never reply to `CLUSTER NODES`.
    stall_membership: bool,
}

/// A fake node with scriptable replies.
pub struct FakeNode {
    pub addr: String,
    state: Arc<Mutex<NodeState>>,
}

impl FakeNode {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let state = Arc::new(Mutex::new(NodeState {
            role: "master",
            ..NodeState::default()
        }));

        let shared = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((sock, _)) = listener.accept().await {
                tokio::spawn(serve(sock, Arc::clone(&shared)));
            }
        });

        Self { addr, state }
    }

    pub fn set_membership(&self, text: impl Into<String>) {
        self.state.lock().unwrap().membership = text.into();
    }

    pub fn set_master_offset(&self, offset: i64) {
        let mut s = self.state.lock().unwrap();
        s.role = "master";
        s.offset = offset;
    }

    pub fn set_slave_offset(&self, offset: i64) {
        let mut s = self.state.lock().unwrap();
        s.role = "slave";
        s.offset = offset;
    }

    pub fn require_pass(&self, password: &str) {
        self.state.lock().unwrap().password = Some(password.into());
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.lock().unwrap().loading = loading;
    }

    pub fn stall_membership(&self) {
        self.state.lock().unwrap().stall_membership = true;
    }
}

async fn serve(mut sock: TcpStream, state: Arc<Mutex<NodeState>>) {
    let mut buf = BytesMut::with_capacity(1024);
    let mut out = BytesMut::new();
    let mut authed = false;

    loop {
        let (frame, consumed) = match parse_frame(&buf) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => match sock.read_buf(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(_) => continue,
            },
            Err(_) => return,
        };
        let _ = buf.split_to(consumed);

        let args = command_args(&frame);
        let reply = {
            let s = state.lock().unwrap();
            dispatch(&s, &args, &mut authed)
        };
        let Some(reply) = reply else {
            // stalled: hold the connection open without answering
            std::future::pending::<()>().await;
            return;
        };

        out.clear();
        reply.serialize(&mut out);
        if sock.write_all(&out).await.is_err() {
            return;
        }
    }
}

fn command_args(frame: &Frame) -> Vec<String> {
    match frame {
        Frame::Array(items) => items.iter().filter_map(Frame::as_text).collect(),
        _ => Vec::new(),
    }
}

/// Builds the reply for one command. `None` means never reply.
fn dispatch(s: &NodeState, args: &[String], authed: &mut bool) -> Option<Frame> {
    let cmd = args.first().map(|a| a.to_ascii_uppercase()).unwrap_or_default();

    if cmd == "AUTH" {
        let ok = s.password.is_some() && args.get(1) == s.password.as_ref();
        *authed = ok;
        return Some(if ok {
            Frame::Simple("OK".into())
        } else {
            Frame::Error("WRONGPASS invalid username-password pair".into())
        });
    }
    if s.password.is_some() && !*authed {
        return Some(Frame::Error("NOAUTH Authentication required.".into()));
    }

    let reply = match cmd.as_str() {
        "PING" if s.loading => Frame::Error("LOADING dataset in memory".into()),
        "PING" => Frame::Simple("PONG".into()),
        "CLUSTER" if s.stall_membership => return None,
        "CLUSTER" => Frame::Bulk(Bytes::from(s.membership.clone())),
        "INFO" => {
            let key = if s.role == "master" {
                "master_repl_offset"
            } else {
                "slave_repl_offset"
            };
            let text = format!(
                "# Replication\r\nrole:{}\r\nconnected_slaves:0\r\n{key}:{}\r\n",
                s.role, s.offset
            );
            Frame::Bulk(Bytes::from(text))
        }
        _ => Frame::Error(format!("ERR unknown command '{cmd}'")),
    };
    Some(reply)
}

/// A status line as a node would report it.
pub fn line(id: &str, addr: &str, region: &str, flags: &str, parent: &str, slots: &str) -> String {
    let mode = if flags.contains("master") { "rw" } else { "r-" };
    format!("{mode} {region}:z1:r1 {id} {addr}@16379 {flags} {parent} 0 0 1 connected {slots}")
        .trim_end()
        .to_string()
}

/// An address nothing listens on.
pub async fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    addr
}

/// Three fake nodes forming one shard: `m` (master, all slots) with
/// slaves `a` and `b`, all in region `bj`.
pub struct Shard {
    pub m: FakeNode,
    pub a: FakeNode,
    pub b: FakeNode,
}

impl Shard {
    pub async fn start() -> Self {
        let shard = Self {
            m: FakeNode::start().await,
            a: FakeNode::start().await,
            b: FakeNode::start().await,
        };
        let text = shard.membership(&[]);
        shard.serve_everywhere(&text);
        shard
    }

    /// The shard's listing, with `suspected` ids flagged `fail?`.
    pub fn membership(&self, suspected: &[&str]) -> String {
        let flags = |id: &str, role: &str| {
            if suspected.contains(&id) {
                format!("{role},fail?")
            } else {
                role.to_string()
            }
        };
        [
            line("m", &self.m.addr, "bj", &flags("m", "master"), "-", "0-16383"),
            line("a", &self.a.addr, "bj", &flags("a", "slave"), "m", ""),
            line("b", &self.b.addr, "bj", &flags("b", "slave"), "m", ""),
        ]
        .join("\n")
    }

    pub fn serve_everywhere(&self, text: &str) {
        for node in self.nodes() {
            node.set_membership(text);
        }
    }

    pub fn nodes(&self) -> [&FakeNode; 3] {
        [&self.m, &self.a, &self.b]
    }

    pub fn addrs(&self) -> Vec<String> {
        self.nodes().iter().map(|n| n.addr.clone()).collect()
    }
}

pub fn config() -> SpectatorConfig {
    SpectatorConfig {
        local_region: "bj".into(),
        interval: Duration::from_millis(50),
        call_timeout: Duration::from_millis(500),
    }
}

pub fn spectator(seeds: Vec<String>) -> Spectator<RespStatusClient> {
    Spectator::new(Arc::new(RespStatusClient::new()), seeds, config())
}
