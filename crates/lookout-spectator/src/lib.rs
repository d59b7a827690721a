//! lookout-spectator: topology reconciliation and failure detection.
//!
//! A [`Spectator`] polls a list of seed nodes on a fixed interval. The
//! first live seed's membership listing becomes the candidate topology;
//! every other live seed must agree with it node for node. Suspected
//! failures reported by a strict majority of local-region observers are
//! promoted to confirmed failures. The result is published as an
//! immutable `Arc<Cluster>` that readers can hold for as long as they
//! like.
//!
//! # Pass outline
//!
//! 1. Probe every seed for liveness
//! 2. Build the candidate from the first live seed
//! 3. Cross-check the candidate against each remaining live seed
//! 4. Promote quorum-confirmed failures
//! 5. Derive replica sets, refresh the seed list, publish
//!
//! Any failure before step 4 leaves the previously published snapshot in
//! place.
//!
//! # Replica queries
//!
//! [`Spectator::replica_set_offsets`] probes every member of a shard
//! concurrently; [`Spectator::most_advanced_replica`] picks the member
//! with the highest replication offset, the candidate a failover would
//! promote.

mod error;
#[cfg(test)]
mod mock;
mod probe;
mod reconcile;
mod spectator;

pub use error::SpectatorError;
pub use probe::{most_advanced, offset_from_info};
pub use reconcile::{check_view, parse_view, view_to_cluster};
pub use spectator::{Spectator, SpectatorConfig};
