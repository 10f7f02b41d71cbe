//! Flood a new state from one hole across everything it is wired to.
//!
//! The flood runs over row and column groups, not individual holes. Each
//! group is expanded at most once per call, so a call does at most
//! `ROW_COUNT + COLUMN_COUNT` expansions regardless of wiring cycles. States
//! already set in the array are overwritten: the last writer wins.

use fixedbitset::FixedBitSet;

use crate::connectivity::Connectivity;
use crate::state::{HoleState, HoleStates};
use crate::topology::{COLUMN_COUNT, Group, HoleId, ROW_COUNT};

/// Groups already reached by the current flood.
struct Visited {
    rows: FixedBitSet,
    columns: FixedBitSet,
}

impl Visited {
    fn new() -> Self {
        Self {
            rows: FixedBitSet::with_capacity(ROW_COUNT),
            columns: FixedBitSet::with_capacity(COLUMN_COUNT),
        }
    }

    /// Mark `group`; returns `true` if it was not marked before.
    fn insert(&mut self, group: Group) -> bool {
        let (set, index) = match group {
            Group::Row(r) => (&mut self.rows, r.index()),
            Group::Column(c) => (&mut self.columns, c.index()),
        };
        !set.put(index)
    }
}

/// Set `seed` to `state` and flood the state to every connected group.
///
/// Returns the number of groups expanded.
pub fn propagate(
    seed: HoleId,
    state: HoleState,
    states: &mut HoleStates,
    conn: &Connectivity,
) -> usize {
    states.set(seed, state);

    let start = seed.group();
    let mut visited = Visited::new();
    visited.insert(start);
    let mut stack = vec![start];
    let mut expanded = 0;

    while let Some(group) = stack.pop() {
        states.fill_group(group, state);
        expanded += 1;

        let mut reach = |next: Group, stack: &mut Vec<Group>| {
            if visited.insert(next) {
                stack.push(next);
            }
        };
        match group {
            Group::Row(row) => {
                for other in conn.rows_linked_to(row) {
                    reach(Group::Row(other), &mut stack);
                }
                for column in conn.columns_bridged_from(row) {
                    reach(Group::Column(column), &mut stack);
                }
            }
            Group::Column(column) => {
                for other in conn.columns_linked_to(column) {
                    reach(Group::Column(other), &mut stack);
                }
                for row in conn.rows_bridged_from(column) {
                    reach(Group::Row(row), &mut stack);
                }
            }
        }
    }
    expanded
}
