//! Replication-offset probing and most-advanced-replica selection.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use lookout_client::{ClientError, InfoSection, StatusClient};
use lookout_topology::{Cluster, ReplicaSet};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Extracts the replication position from an `INFO replication` section.
///
/// Masters report the position of their own stream; slaves report how far
/// they have applied their master's.
pub fn offset_from_info(info: &InfoSection) -> Result<i64, ClientError> {
    match info.get("role") {
        Some("master") => info.get_i64("master_repl_offset"),
        _ => info.get_i64("slave_repl_offset"),
    }
}

/// Probes one node. Any failure, including a timeout, yields `None`.
pub(crate) async fn fetch_repl_offset<C: StatusClient>(
    client: &C,
    addr: &str,
    call_timeout: Duration,
) -> Option<i64> {
    let info = match tokio::time::timeout(call_timeout, client.fetch_replication_info(addr)).await
    {
        Ok(Ok(info)) => info,
        Ok(Err(e)) => {
            debug!(addr, "replication probe failed: {e}");
            return None;
        }
        Err(_) => {
            debug!(addr, ?call_timeout, "replication probe timed out");
            return None;
        }
    };

    match offset_from_info(&info) {
        Ok(offset) => Some(offset),
        Err(e) => {
            debug!(addr, "unusable replication info: {e}");
            None
        }
    }
}

/// Probes every member of `set` concurrently.
///
/// The result has exactly one entry per member; members that could not
/// be probed map to `None`.
pub(crate) async fn replica_set_offsets<C: StatusClient>(
    client: &Arc<C>,
    cluster: &Cluster,
    set: &ReplicaSet,
    call_timeout: Duration,
) -> BTreeMap<String, Option<i64>> {
    let mut offsets: BTreeMap<String, Option<i64>> =
        set.member_ids().iter().map(|id| (id.clone(), None)).collect();

    let mut probes = JoinSet::new();
    for node in cluster.replica_set_nodes(set) {
        let client = Arc::clone(client);
        let id = node.id.clone();
        let addr = node.addr.clone();
        probes.spawn(async move {
            let offset = fetch_repl_offset(client.as_ref(), &addr, call_timeout).await;
            (id, offset)
        });
    }

    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok((id, offset)) => {
                offsets.insert(id, offset);
            }
            Err(e) => warn!("replication probe task failed: {e}"),
        }
    }

    offsets
}

/// Picks the node with the strictly greatest known offset.
///
/// Candidates are scanned in node-id order, so among equal offsets the
/// smallest id wins. With `slave_only`, masters are skipped. Returns
/// `None` when no candidate has a known offset.
pub fn most_advanced(
    cluster: &Cluster,
    offsets: &BTreeMap<String, Option<i64>>,
    slave_only: bool,
) -> Option<String> {
    let mut best: Option<(&str, i64)> = None;
    for (id, offset) in offsets {
        let Some(offset) = *offset else { continue };
        if slave_only && cluster.node(id).is_some_and(|n| n.is_master()) {
            continue;
        }
        if best.map_or(true, |(_, max)| offset > max) {
            best = Some((id, offset));
        }
    }
    best.map(|(id, _)| id.to_string())
}
