//! Full reconciliation passes over real TCP connections.

use std::sync::Arc;

use lookout_client::RespStatusClient;
use lookout_spectator::{Spectator, SpectatorError};
use lookout_topology::TopologyError;

use crate::helpers::{config, dead_addr, line, spectator, Shard};

#[tokio::test]
async fn pass_builds_topology_from_one_seed() {
    let shard = Shard::start().await;
    let sp = spectator(vec![shard.m.addr.clone()]);

    let cluster = sp.reconcile().await.unwrap();
    assert_eq!(cluster.len(), 3);
    assert_eq!(cluster.replica_sets().len(), 1);
    assert_eq!(cluster.replica_set_of("a").unwrap().member_ids(), ["a", "b", "m"]);
    assert!(cluster.uncovered_slots().is_empty());

    // bus port suffix is dropped, so the next seeds are dialable
    assert_eq!(cluster.node("m").unwrap().addr, shard.m.addr);
    assert_eq!(
        sp.seeds().await,
        [shard.a.addr.clone(), shard.b.addr.clone(), shard.m.addr.clone()]
    );

    // the refreshed seed list reconciles too
    let again = sp.reconcile().await.unwrap();
    assert_eq!(again.len(), 3);
}

#[tokio::test]
async fn majority_suspicion_marks_failure() {
    let shard = Shard::start().await;
    shard.m.set_membership(shard.membership(&["b"]));
    shard.a.set_membership(shard.membership(&["b"]));
    shard.b.set_membership(shard.membership(&[]));
    let sp = spectator(shard.addrs());

    let cluster = sp.reconcile().await.unwrap();
    let b = cluster.node("b").unwrap();
    assert_eq!(b.pfail_count, 2);
    assert!(b.fail);
    assert!(!cluster.node("a").unwrap().fail);
    assert_eq!(cluster.summary().failed, 1);
}

#[tokio::test]
async fn minority_suspicion_is_not_failure() {
    let shard = Shard::start().await;
    shard.m.set_membership(shard.membership(&["b"]));
    let sp = spectator(shard.addrs());

    let cluster = sp.reconcile().await.unwrap();
    let b = cluster.node("b").unwrap();
    assert_eq!(b.pfail_count, 1);
    assert!(!b.fail);
    assert_eq!(cluster.summary().suspected, 1);
}

#[tokio::test]
async fn unreachable_and_loading_seeds_are_skipped() {
    let shard = Shard::start().await;
    shard.m.set_loading(true);
    let sp = spectator(vec![dead_addr().await, shard.m.addr.clone(), shard.a.addr.clone()]);

    let cluster = sp.reconcile().await.unwrap();
    assert_eq!(cluster.len(), 3);
}

#[tokio::test]
async fn no_live_seed() {
    let sp = spectator(vec![dead_addr().await, dead_addr().await]);
    assert!(matches!(
        sp.reconcile().await,
        Err(SpectatorError::NoSeedAvailable)
    ));
    assert!(sp.current().is_none());
}

#[tokio::test]
async fn disagreeing_seeds_publish_nothing() {
    let shard = Shard::start().await;
    let skewed = [
        line("m", &shard.m.addr, "bj", "master", "-", "0-8191"),
        line("a", &shard.a.addr, "bj", "slave", "m", ""),
        line("b", &shard.b.addr, "bj", "slave", "m", ""),
    ]
    .join("\n");
    shard.a.set_membership(skewed);
    let sp = spectator(shard.addrs());

    let err = sp.reconcile().await.unwrap_err();
    assert!(matches!(
        err,
        SpectatorError::Topology(TopologyError::TopologyMismatch(ref id)) if id == "m"
    ));
    assert!(sp.current().is_none());
    assert_eq!(sp.seeds().await, shard.addrs());
}

#[tokio::test]
async fn malformed_listing_fails_the_pass() {
    let shard = Shard::start().await;
    shard.m.set_membership("rw bj:z1 m 127.0.0.1:1 master - 0 0 1 connected 0-16383");
    let sp = spectator(vec![shard.m.addr.clone()]);

    let err = sp.reconcile().await.unwrap_err();
    assert!(matches!(
        err,
        SpectatorError::Topology(TopologyError::InvalidTag(_))
    ));
}

#[tokio::test]
async fn stalled_membership_times_out() {
    let shard = Shard::start().await;
    shard.m.stall_membership();
    let sp = spectator(vec![shard.m.addr.clone()]);

    let err = sp.reconcile().await.unwrap_err();
    assert!(matches!(err, SpectatorError::Timeout { .. }));
}

#[tokio::test]
async fn most_advanced_replica_over_tcp() {
    let shard = Shard::start().await;
    shard.m.set_master_offset(100);
    shard.a.set_slave_offset(90);
    shard.b.set_slave_offset(95);
    let sp = spectator(vec![shard.m.addr.clone()]);
    sp.reconcile().await.unwrap();

    let offsets = sp.replica_set_offsets("a").await.unwrap();
    assert_eq!(offsets.len(), 3);
    assert_eq!(offsets["m"], Some(100));
    assert_eq!(offsets["a"], Some(90));
    assert_eq!(offsets["b"], Some(95));

    assert_eq!(sp.most_advanced_replica("m", true).await.unwrap().as_deref(), Some("b"));
    assert_eq!(sp.most_advanced_replica("a", false).await.unwrap().as_deref(), Some("m"));
    assert!(matches!(
        sp.most_advanced_replica("zz", false).await,
        Err(SpectatorError::Topology(TopologyError::NodeNotFound(_)))
    ));
}

#[tokio::test]
async fn password_protected_nodes() {
    let shard = Shard::start().await;
    for node in shard.nodes() {
        node.require_pass("s3cret");
    }

    let without = spectator(vec![shard.m.addr.clone()]);
    assert!(matches!(
        without.reconcile().await,
        Err(SpectatorError::NoSeedAvailable)
    ));

    let with = Spectator::new(
        Arc::new(RespStatusClient::with_password("s3cret")),
        vec![shard.m.addr.clone()],
        config(),
    );
    assert_eq!(with.reconcile().await.unwrap().len(), 3);
}

#[tokio::test]
async fn run_loop_publishes_until_shutdown() {
    let shard = Shard::start().await;
    let sp = Arc::new(spectator(vec![shard.m.addr.clone()]));
    let mut updates = sp.subscribe();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let runner = tokio::spawn({
        let sp = Arc::clone(&sp);
        async move {
            sp.run(async {
                let _ = stop_rx.await;
            })
            .await
        }
    });

    updates.changed().await.unwrap();
    assert_eq!(updates.borrow().as_ref().map(|c| c.len()), Some(3));

    stop_tx.send(()).unwrap();
    runner.await.unwrap();
    assert!(sp.current().is_some());
}
