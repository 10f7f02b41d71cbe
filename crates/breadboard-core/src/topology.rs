//! Breadboard hole addressing.
//!
//! A breadboard has 830 holes numbered from 1. Holes 1..=200 form the power
//! rails: 4 physical rows of 50 holes, each split into two electrically
//! separate halves of 25 (8 row groups). Holes 201..=830 form 10 strip rows
//! of 63 holes. The first 5 strip rows are the top bank and the last 5 the
//! bottom bank, with the bridge between them. A column group is the 5 holes
//! sharing a strip column within one bank, for 126 columns in total.
//!
//! Everything here is a pure function of the hole number. Out-of-range
//! identifiers are rejected with [`TopologyError`] and never clamped.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Total number of addressable holes on a breadboard.
pub const MAX_HOLES: usize = 830;
/// Holes 1..=RAIL_HOLES belong to the power rails.
pub const RAIL_HOLES: u16 = 200;
/// Number of electrical row groups on the power rails.
pub const ROW_COUNT: usize = 8;
/// Holes per row group.
pub const ROW_SIZE: u16 = 25;
/// Number of electrical column groups on the strips.
pub const COLUMN_COUNT: usize = 126;
/// Holes per column group.
pub const COLUMN_SIZE: u16 = 5;
/// Holes per strip row.
pub const STRIP_WIDTH: u16 = 63;
/// Number of strip rows (both banks).
pub const STRIP_ROWS: u16 = 10;
/// Holes per physical power-rail row.
pub const RAIL_WIDTH: u16 = 50;

/// Strip row directly above the bridge.
pub const BRIDGE_BORDER_TOP: std::ops::RangeInclusive<u16> = 453..=515;
/// Strip row directly below the bridge.
pub const BRIDGE_BORDER_BOTTOM: std::ops::RangeInclusive<u16> = 516..=578;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Contract violations in hole addressing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("hole {0} is outside 1..=830")]
    HoleOutOfRange(i64),
    #[error("row {0} is outside 1..=8")]
    RowOutOfRange(usize),
    #[error("column {0} is outside 1..=126")]
    ColumnOutOfRange(usize),
    #[error("hole {0} is not on the power rails")]
    NotInPowerRail(u16),
    #[error("hole {0} is on the power rails")]
    InPowerRail(u16),
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A validated hole number in 1..=830.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct HoleId(u16);

/// A power-rail row group in 1..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(u8);

/// A strip column group in 1..=126.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnId(u8);

/// Placement grouping: 1..=4 are the 50-hole rail rows, 5..=14 the strip rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualRow(u8);

/// The electrical group a hole belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Row(RowId),
    Column(ColumnId),
}

impl HoleId {
    /// Validate a raw hole number.
    pub fn new(raw: u16) -> Result<Self, TopologyError> {
        if raw == 0 || raw as usize > MAX_HOLES {
            return Err(TopologyError::HoleOutOfRange(raw as i64));
        }
        Ok(Self(raw))
    }

    /// The hole for a zero-based array index.
    ///
    /// Panics if `index >= MAX_HOLES`; indices come from arrays sized by
    /// [`MAX_HOLES`].
    pub fn from_index(index: usize) -> Self {
        assert!(index < MAX_HOLES, "hole index {index} out of range");
        Self(index as u16 + 1)
    }

    /// Iterate all holes in ascending order.
    pub fn all() -> impl Iterator<Item = HoleId> {
        (1..=MAX_HOLES as u16).map(HoleId)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// Zero-based position in a hole-state array.
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// The hole `delta` positions away, if it exists.
    pub fn offset(self, delta: i32) -> Result<Self, TopologyError> {
        let target = self.0 as i64 + delta as i64;
        if target < 1 || target > MAX_HOLES as i64 {
            return Err(TopologyError::HoleOutOfRange(target));
        }
        Ok(Self(target as u16))
    }

    pub fn is_in_power_rail(self) -> bool {
        is_in_power_rail(self)
    }

    pub fn is_on_bridge_border_top(self) -> bool {
        is_on_bridge_border_top(self)
    }

    pub fn is_on_bridge_border_bottom(self) -> bool {
        is_on_bridge_border_bottom(self)
    }

    /// The row or column group this hole is wired into.
    pub fn group(self) -> Group {
        if self.0 <= RAIL_HOLES {
            Group::Row(RowId((1 + (self.0 - 1) / ROW_SIZE) as u8))
        } else {
            Group::Column(column_of_strip_hole(self.0))
        }
    }

    pub fn virtual_row(self) -> VirtualRow {
        virtual_row_of(self)
    }
}

impl TryFrom<u16> for HoleId {
    type Error = TopologyError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        HoleId::new(raw)
    }
}

impl From<HoleId> for u16 {
    fn from(hole: HoleId) -> u16 {
        hole.0
    }
}

impl std::fmt::Display for HoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RowId {
    pub fn new(raw: usize) -> Result<Self, TopologyError> {
        if raw == 0 || raw > ROW_COUNT {
            return Err(TopologyError::RowOutOfRange(raw));
        }
        Ok(Self(raw as u8))
    }

    pub fn from_index(index: usize) -> Self {
        assert!(index < ROW_COUNT, "row index {index} out of range");
        Self(index as u8 + 1)
    }

    pub fn all() -> impl Iterator<Item = RowId> {
        (1..=ROW_COUNT as u8).map(RowId)
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// First (lowest-numbered) hole of the row.
    pub fn first_hole(self) -> HoleId {
        HoleId((self.0 as u16 - 1) * ROW_SIZE + 1)
    }

    pub fn holes(self) -> impl Iterator<Item = HoleId> {
        let first = self.first_hole().0;
        (first..first + ROW_SIZE).map(HoleId)
    }
}

impl ColumnId {
    pub fn new(raw: usize) -> Result<Self, TopologyError> {
        if raw == 0 || raw > COLUMN_COUNT {
            return Err(TopologyError::ColumnOutOfRange(raw));
        }
        Ok(Self(raw as u8))
    }

    pub fn from_index(index: usize) -> Self {
        assert!(index < COLUMN_COUNT, "column index {index} out of range");
        Self(index as u8 + 1)
    }

    pub fn all() -> impl Iterator<Item = ColumnId> {
        (1..=COLUMN_COUNT as u8).map(ColumnId)
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// First (top-most) hole of the column.
    pub fn first_hole(self) -> HoleId {
        let column = self.0 as u16;
        let (first_strip_row, strip_column) = if column <= STRIP_WIDTH {
            (1, column)
        } else {
            (1 + COLUMN_SIZE, column - STRIP_WIDTH)
        };
        HoleId(RAIL_HOLES + (first_strip_row - 1) * STRIP_WIDTH + strip_column)
    }

    pub fn holes(self) -> impl Iterator<Item = HoleId> {
        let first = self.first_hole().0;
        (0..COLUMN_SIZE).map(move |i| HoleId(first + i * STRIP_WIDTH))
    }
}

impl VirtualRow {
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Group {
    /// Every hole in this group.
    pub fn holes(self) -> Vec<HoleId> {
        match self {
            Group::Row(row) => row.holes().collect(),
            Group::Column(column) => column.holes().collect(),
        }
    }

    /// The hole a propagation enters this group through.
    pub fn first_hole(self) -> HoleId {
        match self {
            Group::Row(row) => row.first_hole(),
            Group::Column(column) => column.first_hole(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping functions
// ---------------------------------------------------------------------------

fn column_of_strip_hole(raw: u16) -> ColumnId {
    let offset = raw - RAIL_HOLES - 1;
    let strip_row = offset / STRIP_WIDTH + 1;
    let bank_offset = if strip_row <= COLUMN_SIZE { 0 } else { STRIP_WIDTH };
    ColumnId((offset % STRIP_WIDTH + 1 + bank_offset) as u8)
}

pub fn is_in_power_rail(hole: HoleId) -> bool {
    hole.0 <= RAIL_HOLES
}

/// Row group (1..=8) of a power-rail hole.
pub fn row_index_of(hole: HoleId) -> Result<RowId, TopologyError> {
    match hole.group() {
        Group::Row(row) => Ok(row),
        Group::Column(_) => Err(TopologyError::NotInPowerRail(hole.0)),
    }
}

/// Column group (1..=126) of a strip hole.
pub fn column_index_of(hole: HoleId) -> Result<ColumnId, TopologyError> {
    match hole.group() {
        Group::Column(column) => Ok(column),
        Group::Row(_) => Err(TopologyError::InPowerRail(hole.0)),
    }
}

pub fn holes_in_row(row: RowId) -> Vec<HoleId> {
    row.holes().collect()
}

pub fn holes_in_column(column: ColumnId) -> Vec<HoleId> {
    column.holes().collect()
}

pub fn is_on_bridge_border_top(hole: HoleId) -> bool {
    BRIDGE_BORDER_TOP.contains(&hole.0)
}

pub fn is_on_bridge_border_bottom(hole: HoleId) -> bool {
    BRIDGE_BORDER_BOTTOM.contains(&hole.0)
}

pub fn virtual_row_of(hole: HoleId) -> VirtualRow {
    if hole.0 <= RAIL_HOLES {
        VirtualRow((1 + (hole.0 - 1) / RAIL_WIDTH) as u8)
    } else {
        VirtualRow((5 + (hole.0 - RAIL_HOLES - 1) / STRIP_WIDTH) as u8)
    }
}

/// Whether every hole lands in one virtual row. Empty input counts as true.
pub fn are_in_same_virtual_row(holes: &[HoleId]) -> bool {
    match holes.split_first() {
        Some((first, rest)) => {
            let row = first.virtual_row();
            rest.iter().all(|h| h.virtual_row() == row)
        }
        None => true,
    }
}
