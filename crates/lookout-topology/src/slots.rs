//! Slot ranges as they appear in status output.

use std::fmt;

use crate::TopologyError;

/// Total number of hash slots in the cluster.
pub const SLOT_COUNT: u16 = 16384;

/// A contiguous, inclusive range of slots owned by a master.
///
/// # Invariants
///
/// `start <= end < SLOT_COUNT`. Ranges are only built through
/// [`SlotRange::try_new`] or [`SlotRange::parse_token`], which enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotRange {
    pub start: u16,
    pub end: u16, // inclusive
}

impl SlotRange {
    /// Creates a range, rejecting reversed or out-of-bounds values.
    pub fn try_new(start: u16, end: u16) -> Result<Self, TopologyError> {
        if start > end {
            return Err(TopologyError::malformed(format!(
                "slot range {start}-{end} is reversed"
            )));
        }
        if end >= SLOT_COUNT {
            return Err(TopologyError::malformed(format!(
                "slot {end} out of range (max {})",
                SLOT_COUNT - 1
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses a slot token: `"<start>-<end>"` or a bare `"<slot>"`.
    ///
    /// A bare slot becomes a one-slot range.
    pub fn parse_token(token: &str) -> Result<Self, TopologyError> {
        match token.split_once('-') {
            Some((left, right)) => Self::try_new(parse_slot(left)?, parse_slot(right)?),
            None => {
                let slot = parse_slot(token)?;
                Self::try_new(slot, slot)
            }
        }
    }

    /// Number of slots in this range.
    pub fn len(&self) -> u16 {
        self.end - self.start + 1
    }

    /// Always false; a valid range holds at least one slot.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if `slot` falls inside this range.
    pub fn contains(&self, slot: u16) -> bool {
        slot >= self.start && slot <= self.end
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

fn parse_slot(s: &str) -> Result<u16, TopologyError> {
    s.parse::<u16>()
        .map_err(|_| TopologyError::malformed(format!("invalid slot '{s}'")))
}

/// Returns the slot ranges not covered by any of `owned`, ascending.
pub(crate) fn uncovered<'a>(owned: impl IntoIterator<Item = &'a SlotRange>) -> Vec<SlotRange> {
    let mut coverage = vec![false; SLOT_COUNT as usize];
    for range in owned {
        for slot in range.start..=range.end {
            coverage[slot as usize] = true;
        }
    }

    let mut gaps = Vec::new();
    let mut start: Option<u16> = None;
    for (i, &covered) in coverage.iter().enumerate() {
        let slot = i as u16;
        match (covered, start) {
            (false, None) => start = Some(slot),
            (true, Some(s)) => {
                gaps.push(SlotRange { start: s, end: slot - 1 });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        gaps.push(SlotRange { start: s, end: SLOT_COUNT - 1 });
    }
    gaps
}
