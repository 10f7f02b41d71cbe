//! Logic levels and the per-board hole-state array.

use serde::{Deserialize, Serialize};

use crate::topology::{Group, HoleId, MAX_HOLES};

/// Electrical state of a single hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HoleState {
    High,
    Low,
    #[default]
    NoConnection,
}

impl HoleState {
    /// Map a bit to a driven level.
    pub fn from_bit(bit: bool) -> Self {
        if bit { HoleState::High } else { HoleState::Low }
    }

    pub fn is_high(self) -> bool {
        self == HoleState::High
    }

    pub fn is_low(self) -> bool {
        self == HoleState::Low
    }

    /// Single-character form used in traces: `H`, `L` or `N`.
    pub fn as_char(self) -> char {
        match self {
            HoleState::High => 'H',
            HoleState::Low => 'L',
            HoleState::NoConnection => 'N',
        }
    }
}

/// One state per hole, indexed by [`HoleId`].
///
/// A fresh array reports [`HoleState::NoConnection`] everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HoleStates {
    states: Vec<HoleState>,
}

impl HoleStates {
    pub fn new() -> Self {
        Self {
            states: vec![HoleState::NoConnection; MAX_HOLES],
        }
    }

    pub fn get(&self, hole: HoleId) -> HoleState {
        self.states[hole.index()]
    }

    pub fn set(&mut self, hole: HoleId, state: HoleState) {
        self.states[hole.index()] = state;
    }

    /// Assign `state` to every hole in `group`.
    pub fn fill_group(&mut self, group: Group, state: HoleState) {
        for hole in group.holes() {
            self.states[hole.index()] = state;
        }
    }

    /// Reset every hole to [`HoleState::NoConnection`].
    pub fn clear(&mut self) {
        self.states.fill(HoleState::NoConnection);
    }

    pub fn iter(&self) -> impl Iterator<Item = (HoleId, HoleState)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, &s)| (HoleId::from_index(i), s))
    }

    pub fn as_slice(&self) -> &[HoleState] {
        &self.states
    }

    /// Number of holes that differ from `other`.
    pub fn diff_count(&self, other: &HoleStates) -> usize {
        self.states
            .iter()
            .zip(&other.states)
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Compact `H`/`L`/`N` rendering, one character per hole.
    pub fn to_trace_string(&self) -> String {
        self.states.iter().map(|s| s.as_char()).collect()
    }
}

impl Default for HoleStates {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<HoleId> for HoleStates {
    type Output = HoleState;

    fn index(&self, hole: HoleId) -> &HoleState {
        &self.states[hole.index()]
    }
}
