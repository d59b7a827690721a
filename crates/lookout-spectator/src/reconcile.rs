//! Building and cross-checking a topology from seed listings.
//!
//! The pure halves (`parse_view`, `view_to_cluster`, `check_view`) work
//! on text and nodes already in hand; the async halves fetch a seed's
//! listing under the per-call timeout and feed it through them.

use std::time::Duration;

use lookout_client::StatusClient;
use lookout_topology::{parse_status_line, Cluster, Node, TopologyError};
use tracing::debug;

use crate::SpectatorError;

/// Parses a whole membership listing. Blank lines are skipped; the first
/// bad line fails the whole listing.
pub fn parse_view(text: &str) -> Result<Vec<Node>, TopologyError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_status_line)
        .collect()
}

/// Turns the first seed's nodes into a candidate cluster.
pub fn view_to_cluster(local_region: &str, nodes: Vec<Node>) -> Cluster {
    let mut cluster = Cluster::new(local_region);
    for node in nodes {
        cluster.add_node(node);
    }
    cluster
}

/// Checks another seed's nodes against the candidate.
///
/// Every node must already be in `cluster` with identical authoritative
/// fields. Suspicion reported by this seed is added to the candidate's
/// evidence counter. On error the candidate must be discarded: counters
/// for nodes checked before the failure have already been bumped.
pub fn check_view(cluster: &mut Cluster, nodes: Vec<Node>) -> Result<(), TopologyError> {
    for seen in nodes {
        let Some(known) = cluster.node_mut(&seen.id) else {
            return Err(TopologyError::NodeNotFound(seen.id));
        };
        if !known.same_topology(&seen) {
            return Err(TopologyError::TopologyMismatch(seen.id));
        }
        if seen.pfail {
            known.incr_pfail_count();
        }
    }
    Ok(())
}

/// Fetches and parses one seed's listing.
pub(crate) async fn fetch_view<C: StatusClient>(
    client: &C,
    seed: &str,
    call_timeout: Duration,
) -> Result<Vec<Node>, SpectatorError> {
    let text = tokio::time::timeout(call_timeout, client.fetch_membership(seed))
        .await
        .map_err(|_| SpectatorError::Timeout {
            op: "membership fetch",
            addr: seed.to_string(),
            after: call_timeout,
        })??;
    let nodes = parse_view(&text)?;
    debug!(seed, nodes = nodes.len(), "fetched membership view");
    Ok(nodes)
}

/// Builds the candidate cluster from the first live seed.
pub(crate) async fn build_topology<C: StatusClient>(
    client: &C,
    seed: &str,
    local_region: &str,
    call_timeout: Duration,
) -> Result<Cluster, SpectatorError> {
    let nodes = fetch_view(client, seed, call_timeout).await?;
    Ok(view_to_cluster(local_region, nodes))
}

/// Cross-checks the candidate against one more seed.
pub(crate) async fn check_topology<C: StatusClient>(
    client: &C,
    seed: &str,
    cluster: &mut Cluster,
    call_timeout: Duration,
) -> Result<(), SpectatorError> {
    let nodes = fetch_view(client, seed, call_timeout).await?;
    check_view(cluster, nodes)?;
    Ok(())
}
