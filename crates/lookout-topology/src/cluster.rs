//! Cluster snapshots and replica-set derivation.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::node::Node;
use crate::slots::{self, SlotRange};

/// A master and every node replicating it.
///
/// Derived from parent links by [`Cluster::build_replica_sets`]; never
/// authored directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaSet {
    master_id: String,
    /// Member ids in ascending order. Includes the master when it is known.
    members: Vec<String>,
}

impl ReplicaSet {
    /// The id of the master this set is built around.
    ///
    /// Slaves whose master is absent from the snapshot still group under
    /// the missing master's id.
    pub fn master_id(&self) -> &str {
        &self.master_id
    }

    pub fn member_ids(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.members.binary_search_by(|m| m.as_str().cmp(node_id)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One reconciled view of the cluster.
///
/// Nodes are keyed by id in an ordered map so every walk over the
/// topology is deterministic.
#[derive(Debug, Clone)]
pub struct Cluster {
    local_region: String,
    nodes: BTreeMap<String, Node>,
    replica_sets: Vec<ReplicaSet>,
    /// node id → index into `replica_sets`
    set_index: HashMap<String, usize>,
}

impl Cluster {
    /// Creates an empty cluster scoped to `local_region`.
    pub fn new(local_region: impl Into<String>) -> Self {
        Self {
            local_region: local_region.into(),
            nodes: BTreeMap::new(),
            replica_sets: Vec::new(),
            set_index: HashMap::new(),
        }
    }

    pub fn local_region(&self) -> &str {
        &self.local_region
    }

    /// Adds a node, replacing any earlier node with the same id.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// All nodes, ascending by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes placed in the local region, ascending by id.
    pub fn local_region_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .values()
            .filter(move |n| n.region() == self.local_region)
    }

    pub fn num_local_region_nodes(&self) -> usize {
        self.local_region_nodes().count()
    }

    /// Regroups nodes into replica sets from their parent links.
    ///
    /// Call after the last node is added; sets computed earlier are
    /// discarded.
    pub fn build_replica_sets(&mut self) {
        let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for node in self.nodes.values() {
            groups
                .entry(node.master_id())
                .or_default()
                .push(node.id.clone());
        }

        let mut sets = Vec::with_capacity(groups.len());
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (master_id, members) in groups {
            // members were pushed in id order from the BTreeMap walk
            for id in &members {
                index.insert(id.clone(), sets.len());
            }
            sets.push(ReplicaSet {
                master_id: master_id.to_string(),
                members,
            });
        }

        self.replica_sets = sets;
        self.set_index = index;
    }

    /// All replica sets, ascending by master id.
    pub fn replica_sets(&self) -> &[ReplicaSet] {
        &self.replica_sets
    }

    /// The replica set containing `node_id`, if the node is known.
    pub fn replica_set_of(&self, node_id: &str) -> Option<&ReplicaSet> {
        let idx = *self.set_index.get(node_id)?;
        self.replica_sets.get(idx)
    }

    /// Resolves the members of `set` to nodes in this cluster.
    pub fn replica_set_nodes<'a>(&'a self, set: &'a ReplicaSet) -> impl Iterator<Item = &'a Node> {
        set.members.iter().filter_map(move |id| self.nodes.get(id))
    }

    /// Marks local-region nodes as failed once a strict majority of
    /// local-region observers suspected them.
    ///
    /// Only ever promotes. Returns the ids promoted by this call.
    pub fn promote_failures(&mut self) -> Vec<String> {
        let quorum = self.num_local_region_nodes() / 2;
        let mut promoted = Vec::new();
        for node in self.nodes.values_mut() {
            if node.region() != self.local_region || node.fail {
                continue;
            }
            if node.pfail_count > quorum {
                node.fail = true;
                promoted.push(node.id.clone());
            }
        }
        promoted
    }

    /// Slot ranges no master claims.
    pub fn uncovered_slots(&self) -> Vec<SlotRange> {
        slots::uncovered(
            self.nodes
                .values()
                .filter(|n| n.is_master())
                .flat_map(|n| n.ranges.iter()),
        )
    }

    /// Counts worth logging after a pass.
    pub fn summary(&self) -> ClusterSummary {
        ClusterSummary {
            nodes: self.nodes.len(),
            local_region_nodes: self.num_local_region_nodes(),
            replica_sets: self.replica_sets.len(),
            suspected: self.nodes.values().filter(|n| n.pfail_count > 0).count(),
            failed: self.nodes.values().filter(|n| n.fail).count(),
            uncovered: self.uncovered_slots(),
        }
    }
}

/// Headline numbers for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    pub nodes: usize,
    pub local_region_nodes: usize,
    pub replica_sets: usize,
    /// Nodes at least one seed suspected.
    pub suspected: usize,
    pub failed: usize,
    pub uncovered: Vec<SlotRange>,
}

impl ClusterSummary {
    pub fn uncovered_slot_count(&self) -> u32 {
        self.uncovered.iter().map(|r| r.len() as u32).sum()
    }
}

impl fmt::Display for ClusterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes={} local={} replica_sets={} suspected={} failed={} uncovered_slots={}",
            self.nodes,
            self.local_region_nodes,
            self.replica_sets,
            self.suspected,
            self.failed,
            self.uncovered_slot_count(),
        )
    }
}
