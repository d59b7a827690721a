//! Nodes as reported by a seed's status listing.

use std::fmt;

use crate::slots::SlotRange;
use crate::TopologyError;

/// The role of a node within its replica set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Owns slot ranges and streams writes to its slaves.
    Master,
    /// Replicates a master.
    Slave,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Master => write!(f, "master"),
            Role::Slave => write!(f, "slave"),
        }
    }
}

/// Where a node lives, from its `region:zone:room` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placement {
    pub region: String,
    pub zone: String,
    pub room: String,
}

impl Placement {
    /// Parses a tag of exactly three colon-separated parts.
    pub fn from_tag(tag: &str) -> Result<Self, TopologyError> {
        let parts: Vec<&str> = tag.split(':').collect();
        let [region, zone, room] = parts.as_slice() else {
            return Err(TopologyError::InvalidTag(tag.to_string()));
        };
        Ok(Self {
            region: region.to_string(),
            zone: zone.to_string(),
            room: room.to_string(),
        })
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.region, self.zone, self.room)
    }
}

/// One cluster member as seen during a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Stable node identifier.
    pub id: String,
    /// `host:port` for client and status connections.
    pub addr: String,
    /// The master this node replicates, if it is a slave.
    pub parent_id: Option<String>,
    pub placement: Placement,
    pub readable: bool,
    pub writable: bool,
    pub role: Role,
    /// Owned slot ranges, ascending by start.
    pub ranges: Vec<SlotRange>,
    /// Set when the status line carried an in-flight slot marker.
    pub migrating: bool,
    /// The reporting seed suspects this node is down.
    pub pfail: bool,
    /// How many seeds reported `pfail` during this pass.
    pub pfail_count: usize,
    /// Promoted to failed by quorum.
    pub fail: bool,
}

impl Node {
    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }

    /// The id of the master whose replica set this node belongs to.
    pub fn master_id(&self) -> &str {
        match (&self.role, &self.parent_id) {
            (Role::Slave, Some(parent)) => parent,
            _ => &self.id,
        }
    }

    pub fn region(&self) -> &str {
        &self.placement.region
    }

    /// Compares the fields every seed must agree on.
    ///
    /// Health state and the migration marker are per-observer and are
    /// left out.
    pub fn same_topology(&self, other: &Node) -> bool {
        self.id == other.id
            && self.addr == other.addr
            && self.parent_id == other.parent_id
            && self.placement == other.placement
            && self.readable == other.readable
            && self.writable == other.writable
            && self.role == other.role
            && self.ranges == other.ranges
    }

    /// Counts one more seed's suspicion.
    pub fn incr_pfail_count(&mut self) {
        self.pfail_count += 1;
    }

    /// Total number of slots owned.
    pub fn slot_count(&self) -> u32 {
        self.ranges.iter().map(|r| r.len() as u32).sum()
    }

    /// Formats the node as a status line.
    ///
    /// The four metadata columns are not tracked, so they are written as
    /// zeros and `connected`.
    pub fn to_status_line(&self) -> String {
        let mode = format!(
            "{}{}",
            if self.readable { 'r' } else { '-' },
            if self.writable { 'w' } else { '-' }
        );

        let mut flags = self.role.to_string();
        if self.fail {
            flags.push_str(",fail");
        } else if self.pfail {
            flags.push_str(",fail?");
        }

        let mut line = format!(
            "{mode} {} {} {} {flags} {} 0 0 0 connected",
            self.placement,
            self.id,
            self.addr,
            self.parent_id.as_deref().unwrap_or("-"),
        );
        for range in &self.ranges {
            line.push(' ');
            line.push_str(&range.to_string());
        }
        line
    }
}
