//! lookout-topology: the cluster model lookout reconciles.
//!
//! A [`Cluster`] is one immutable view of membership: every [`Node`] a
//! seed reported, grouped into [`ReplicaSet`]s, scoped to the region whose
//! nodes vote on failures.
//!
//! # Quick Start
//!
//! ```
//! use lookout_topology::{parse_status_line, Cluster};
//!
//! let mut cluster = Cluster::new("bj");
//! let line = "rw bj:z1:r1 aaaa 10.0.0.1:6379 myself,master - 0 0 1 connected 0-8191";
//! cluster.add_node(parse_status_line(line).unwrap());
//! cluster.build_replica_sets();
//!
//! assert_eq!(cluster.num_local_region_nodes(), 1);
//! assert!(cluster.replica_set_of("aaaa").is_some());
//! ```

mod cluster;
mod error;
mod node;
mod slots;
mod status;

pub use cluster::{Cluster, ClusterSummary, ReplicaSet};
pub use error::TopologyError;
pub use node::{Node, Placement, Role};
pub use slots::{SlotRange, SLOT_COUNT};
pub use status::parse_status_line;
