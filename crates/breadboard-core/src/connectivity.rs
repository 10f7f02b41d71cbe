//! Connection matrices for one breadboard.
//!
//! A [`Connectivity`] is a pure function of the direct hole-to-hole links on
//! a board (wires with both ends on it, plus resistors mounted on it). It
//! holds four matrices:
//!
//! - row x row (8 x 8) and column x column (126 x 126), reflexive and
//!   symmetric, set where a link joins the two groups;
//! - row x column (8 x 126), set where a link joins a row to a column;
//! - hole x hole (830 x 830), reflexive and symmetric, set where two holes
//!   share a group or are joined by a link.
//!
//! It also labels every hole with the id of the electrical net it belongs
//! to, which answers reachability queries over the hole matrix in O(1).

use std::collections::VecDeque;

use crate::bitmatrix::BitMatrix;
use crate::circuit::Circuit;
use crate::id::ComponentId;
use crate::topology::{COLUMN_COUNT, ColumnId, Group, HoleId, MAX_HOLES, ROW_COUNT, RowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connectivity {
    rows: BitMatrix,
    columns: BitMatrix,
    row_columns: BitMatrix,
    holes: BitMatrix,
    net: Vec<u16>,
}

impl Connectivity {
    /// Resolve the links currently on `board`.
    pub fn resolve(circuit: &Circuit, board: ComponentId) -> Self {
        Self::from_links(&circuit.links_on(board))
    }

    /// Build all matrices from a list of direct links.
    pub fn from_links(links: &[(HoleId, HoleId)]) -> Self {
        let mut rows = BitMatrix::identity(ROW_COUNT);
        let mut columns = BitMatrix::identity(COLUMN_COUNT);
        let mut row_columns = BitMatrix::new(ROW_COUNT, COLUMN_COUNT);

        for &(a, b) in links {
            match (a.group(), b.group()) {
                (Group::Row(r1), Group::Row(r2)) => rows.set_symmetric(r1.index(), r2.index()),
                (Group::Column(c1), Group::Column(c2)) => {
                    columns.set_symmetric(c1.index(), c2.index())
                }
                (Group::Row(r), Group::Column(c)) | (Group::Column(c), Group::Row(r)) => {
                    row_columns.set(r.index(), c.index())
                }
            }
        }

        let holes = hole_matrix(links);
        let net = label_nets(&holes);
        Self {
            rows,
            columns,
            row_columns,
            holes,
            net,
        }
    }

    pub fn rows_connected(&self, a: RowId, b: RowId) -> bool {
        self.rows.get(a.index(), b.index())
    }

    pub fn columns_connected(&self, a: ColumnId, b: ColumnId) -> bool {
        self.columns.get(a.index(), b.index())
    }

    pub fn row_column_connected(&self, row: RowId, column: ColumnId) -> bool {
        self.row_columns.get(row.index(), column.index())
    }

    /// Whether two holes are directly adjacent (same group or one link).
    pub fn holes_adjacent(&self, a: HoleId, b: HoleId) -> bool {
        self.holes.get(a.index(), b.index())
    }

    /// Whether a path of adjacent holes joins `a` and `b`.
    pub fn holes_connected(&self, a: HoleId, b: HoleId) -> bool {
        self.net[a.index()] == self.net[b.index()]
    }

    /// Net id of a hole. Holes share an id iff they are connected.
    pub fn net_of(&self, hole: HoleId) -> u16 {
        self.net[hole.index()]
    }

    /// Rows linked to `row`, excluding itself.
    pub fn rows_linked_to(&self, row: RowId) -> impl Iterator<Item = RowId> + '_ {
        self.rows
            .row_ones(row.index())
            .filter(move |&i| i != row.index())
            .map(RowId::from_index)
    }

    /// Columns linked to `column`, excluding itself.
    pub fn columns_linked_to(&self, column: ColumnId) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns
            .row_ones(column.index())
            .filter(move |&i| i != column.index())
            .map(ColumnId::from_index)
    }

    pub fn columns_bridged_from(&self, row: RowId) -> impl Iterator<Item = ColumnId> + '_ {
        self.row_columns.row_ones(row.index()).map(ColumnId::from_index)
    }

    pub fn rows_bridged_from(&self, column: ColumnId) -> impl Iterator<Item = RowId> + '_ {
        self.row_columns.col_ones(column.index()).map(RowId::from_index)
    }

    pub fn row_matrix(&self) -> &BitMatrix {
        &self.rows
    }

    pub fn column_matrix(&self) -> &BitMatrix {
        &self.columns
    }

    pub fn row_column_matrix(&self) -> &BitMatrix {
        &self.row_columns
    }

    pub fn hole_matrix(&self) -> &BitMatrix {
        &self.holes
    }
}

fn hole_matrix(links: &[(HoleId, HoleId)]) -> BitMatrix {
    let mut holes = BitMatrix::identity(MAX_HOLES);
    let groups = RowId::all()
        .map(Group::Row)
        .chain(ColumnId::all().map(Group::Column));
    for group in groups {
        let members = group.holes();
        for a in &members {
            for b in &members {
                holes.set(a.index(), b.index());
            }
        }
    }
    for &(a, b) in links {
        holes.set_symmetric(a.index(), b.index());
    }
    holes
}

/// Breadth-first labelling of the undirected graph given by `adjacency`.
fn label_nets(adjacency: &BitMatrix) -> Vec<u16> {
    const UNSEEN: u16 = u16::MAX;
    let mut net = vec![UNSEEN; adjacency.rows()];
    let mut next = 0u16;
    let mut queue = VecDeque::new();

    for start in 0..adjacency.rows() {
        if net[start] != UNSEEN {
            continue;
        }
        net[start] = next;
        queue.push_back(start);
        while let Some(i) = queue.pop_front() {
            for j in adjacency.row_ones(i) {
                if net[j] == UNSEEN {
                    net[j] = next;
                    queue.push_back(j);
                }
            }
        }
        next += 1;
    }
    net
}
