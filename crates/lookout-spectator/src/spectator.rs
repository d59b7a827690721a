//! The reconciliation engine and its read-side queries.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use lookout_client::StatusClient;
use lookout_topology::{Cluster, TopologyError};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::probe;
use crate::reconcile::{build_topology, check_topology};
use crate::SpectatorError;

/// Tuning for a [`Spectator`].
#[derive(Debug, Clone)]
pub struct SpectatorConfig {
    /// Region whose nodes vote on failures and become the next seeds.
    pub local_region: String,
    /// Time between the starts of two passes.
    pub interval: Duration,
    /// Upper bound on any single node query.
    pub call_timeout: Duration,
}

impl Default for SpectatorConfig {
    fn default() -> Self {
        Self {
            local_region: String::new(),
            interval: Duration::from_secs(1),
            call_timeout: Duration::from_secs(2),
        }
    }
}

/// Reconciles seed views into a published cluster snapshot.
///
/// Passes are serialized by the seed-list mutex. Readers only ever see
/// the last published `Arc<Cluster>`, which a pass swaps in as its final
/// step, so a slow or failing pass never blocks them.
pub struct Spectator<C> {
    client: Arc<C>,
    config: SpectatorConfig,
    seeds: Mutex<Vec<String>>,
    snapshot_tx: watch::Sender<Option<Arc<Cluster>>>,
}

impl<C: StatusClient> Spectator<C> {
    pub fn new(client: Arc<C>, seeds: Vec<String>, config: SpectatorConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            client,
            config,
            seeds: Mutex::new(seeds),
            snapshot_tx,
        }
    }

    pub fn config(&self) -> &SpectatorConfig {
        &self.config
    }

    /// The last published snapshot, or `None` before the first good pass.
    pub fn current(&self) -> Option<Arc<Cluster>> {
        self.snapshot_tx.borrow().clone()
    }

    /// A receiver that is notified each time a pass publishes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Cluster>>> {
        self.snapshot_tx.subscribe()
    }

    /// The seeds the next pass will use. Waits for a running pass.
    pub async fn seeds(&self) -> Vec<String> {
        self.seeds.lock().await.clone()
    }

    /// Runs one reconciliation pass and publishes the result.
    ///
    /// On error nothing is published and the seed list is unchanged.
    pub async fn reconcile(&self) -> Result<Arc<Cluster>, SpectatorError> {
        let mut seeds = self.seeds.lock().await;
        if seeds.is_empty() {
            return Err(SpectatorError::NoSeedAvailable);
        }

        // each address is one observer, however often it is listed
        let unique = dedup_seeds(&seeds);
        let live = self.live_seeds(&unique).await;
        let Some((first, rest)) = live.split_first() else {
            return Err(SpectatorError::NoSeedAvailable);
        };

        let timeout = self.config.call_timeout;
        let mut cluster =
            build_topology(self.client.as_ref(), first, &self.config.local_region, timeout).await?;
        for seed in rest {
            check_topology(self.client.as_ref(), seed, &mut cluster, timeout).await?;
        }

        let local = cluster.num_local_region_nodes();
        for id in cluster.promote_failures() {
            if let Some(node) = cluster.node(&id) {
                warn!(
                    node = %id,
                    addr = %node.addr,
                    votes = node.pfail_count,
                    local_nodes = local,
                    "node marked failed by quorum"
                );
            }
        }
        cluster.build_replica_sets();

        let next: Vec<String> = cluster.local_region_nodes().map(|n| n.addr.clone()).collect();
        if next.is_empty() {
            warn!(
                region = %self.config.local_region,
                "no nodes in local region, keeping previous seeds"
            );
        } else {
            *seeds = next;
        }

        let cluster = Arc::new(cluster);
        self.snapshot_tx.send_replace(Some(Arc::clone(&cluster)));
        Ok(cluster)
    }

    /// Probes every seed at once and returns the live ones in seed order.
    async fn live_seeds(&self, seeds: &[String]) -> Vec<String> {
        let timeout = self.config.call_timeout;
        let mut probes = JoinSet::new();
        for (idx, seed) in seeds.iter().enumerate() {
            let client = Arc::clone(&self.client);
            let seed = seed.clone();
            probes.spawn(async move {
                let alive = tokio::time::timeout(timeout, client.is_alive(&seed))
                    .await
                    .unwrap_or(false);
                (idx, alive)
            });
        }

        let mut alive = vec![false; seeds.len()];
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((idx, up)) => alive[idx] = up,
                Err(e) => warn!("liveness probe task failed: {e}"),
            }
        }

        seeds
            .iter()
            .zip(alive)
            .filter_map(|(seed, up)| {
                if !up {
                    debug!(seed = %seed, "seed not answering");
                }
                up.then(|| seed.clone())
            })
            .collect()
    }

    /// Runs passes on the configured interval until `shutdown` resolves.
    ///
    /// A pass that overruns the interval swallows the ticks it missed.
    /// Shutdown abandons a pass in flight; nothing from it is published.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        let mut tick = tokio::time::interval(self.config.interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = tick.tick() => {}
                _ = &mut shutdown => break,
            }
            tokio::select! {
                result = self.reconcile() => log_pass(result),
                _ = &mut shutdown => {
                    info!("shutdown during reconciliation pass, abandoning it");
                    break;
                }
            }
        }
        info!("spectator shutting down");
    }

    /// Replication offsets for every member of `node_id`'s replica set.
    pub async fn replica_set_offsets(
        &self,
        node_id: &str,
    ) -> Result<BTreeMap<String, Option<i64>>, SpectatorError> {
        let cluster = self.snapshot_for(node_id)?;
        let set = cluster
            .replica_set_of(node_id)
            .ok_or_else(|| TopologyError::NodeNotFound(node_id.to_string()))?;
        Ok(probe::replica_set_offsets(&self.client, &cluster, set, self.config.call_timeout).await)
    }

    /// The member of `node_id`'s replica set with the highest replication
    /// offset, masters excluded when `slave_only` is set.
    ///
    /// `Ok(None)` means no eligible member could be probed.
    pub async fn most_advanced_replica(
        &self,
        node_id: &str,
        slave_only: bool,
    ) -> Result<Option<String>, SpectatorError> {
        let cluster = self.snapshot_for(node_id)?;
        let set = cluster
            .replica_set_of(node_id)
            .ok_or_else(|| TopologyError::NodeNotFound(node_id.to_string()))?;
        let offsets =
            probe::replica_set_offsets(&self.client, &cluster, set, self.config.call_timeout).await;
        Ok(probe::most_advanced(&cluster, &offsets, slave_only))
    }

    fn snapshot_for(&self, node_id: &str) -> Result<Arc<Cluster>, SpectatorError> {
        self.current()
            .ok_or_else(|| TopologyError::NodeNotFound(node_id.to_string()).into())
    }
}

fn log_pass(result: Result<Arc<Cluster>, SpectatorError>) {
    match result {
        Ok(cluster) => {
            let summary = cluster.summary();
            info!("topology published: {summary}");
            if !summary.uncovered.is_empty() {
                warn!(
                    ranges = summary.uncovered.len(),
                    slots = summary.uncovered_slot_count(),
                    "slots not served by any master"
                );
            }
        }
        Err(e) if e.is_inconsistency() => {
            warn!("seeds disagree, keeping previous topology: {e}");
        }
        Err(e) => warn!("reconciliation pass failed: {e}"),
    }
}

/// Drops repeated addresses, keeping the first occurrence of each.
fn dedup_seeds(seeds: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(seeds.len());
    seeds
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}
