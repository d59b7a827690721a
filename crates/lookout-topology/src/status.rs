//! Parser for one line of a node's membership listing.
//!
//! Line layout, whitespace separated:
//!
//! ```text
//! <mode> <region:zone:room> <id> <host:port[@bus]> <flags> <parent|-> \
//!     <ping-sent> <pong-recv> <epoch> <link-state> [slot ...]
//! ```
//!
//! `mode` is two characters, `r`/`-` then `w`/`-`. Slot tokens are either
//! `start-end`, a bare slot, or a bracketed migration marker such as
//! `[93->-e7d1...]`.

use crate::node::{Node, Placement, Role};
use crate::slots::SlotRange;
use crate::TopologyError;

/// Fields before the first slot token.
const FIXED_FIELDS: usize = 10;

/// Flag substring marking a node the reporter suspects is down.
const PFAIL_FLAG: &str = "fail?";

/// Parses one trimmed, non-empty status line into a [`Node`].
///
/// A node reported with the suspected-failure flag starts with
/// `pfail_count = 1`: the reporting seed's own vote.
pub fn parse_status_line(line: &str) -> Result<Node, TopologyError> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    // a bad tag poisons the line no matter what else is wrong with it
    let placement = match fields.get(1) {
        Some(tag) => Placement::from_tag(tag)?,
        None => return Err(TopologyError::malformed(format!("missing tag: '{line}'"))),
    };

    if fields.len() < FIXED_FIELDS {
        return Err(TopologyError::malformed(format!(
            "expected at least {FIXED_FIELDS} fields, got {}: '{line}'",
            fields.len()
        )));
    }

    let (mode, id, addr, flags, parent) = (fields[0], fields[2], fields[3], fields[4], fields[5]);
    // fields[6..10] are ping/pong/epoch/link metadata and are not used

    let (readable, writable) = match mode.as_bytes() {
        [r @ (b'r' | b'-'), w @ (b'w' | b'-')] => (*r == b'r', *w == b'w'),
        _ => return Err(TopologyError::malformed(format!("invalid mode '{mode}'"))),
    };

    let mut migrating = false;
    let mut ranges = Vec::new();
    for &token in &fields[FIXED_FIELDS..] {
        if token.starts_with('[') {
            migrating = true;
            continue;
        }
        ranges.push(SlotRange::parse_token(token)?);
    }
    // nodes list slots in their own order; sort so views compare equal
    ranges.sort_unstable();

    let role = if flags.contains("master") {
        Role::Master
    } else {
        Role::Slave
    };
    let pfail = flags.contains(PFAIL_FLAG);

    let parent_id = match parent {
        "-" | "" => None,
        p => Some(p.to_string()),
    };

    // address may carry a cluster bus port: host:port@bus
    let addr = addr.split('@').next().unwrap_or(addr);

    Ok(Node {
        id: id.to_string(),
        addr: addr.to_string(),
        parent_id,
        placement,
        readable,
        writable,
        role,
        ranges,
        migrating,
        pfail,
        pfail_count: usize::from(pfail),
        fail: false,
    })
}
