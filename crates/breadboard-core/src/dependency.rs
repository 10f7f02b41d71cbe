//! Evaluation order for the ICs on one board.
//!
//! IC `i` depends on IC `j` (edge `j -> i`) when some output pin of `j` is
//! electrically reachable from some input pin of `i`. Any edge marks the set
//! as having dependencies. A mutual pair (including an IC feeding itself)
//! marks it cyclic, and the input order is kept. Otherwise Kahn's
//! algorithm orders the ICs. If the sort cannot consume every node, a longer
//! cycle exists: the set is marked cyclic and the input order is kept.

use std::collections::VecDeque;

use crate::bitmatrix::BitMatrix;
use crate::connectivity::Connectivity;
use crate::topology::HoleId;

/// Input and output pin holes of one IC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IcTerminals {
    pub inputs: Vec<HoleId>,
    pub outputs: Vec<HoleId>,
}

/// Result of [`sort_by_dependency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOrder {
    /// Indices into the input slice, in evaluation order.
    pub order: Vec<usize>,
    /// At least one dependency edge exists.
    pub has_dependencies: bool,
    /// The edges contain a cycle; `order` is the input order.
    pub cyclic: bool,
    /// `matrix[j][i]` is set for every edge `j -> i`.
    pub matrix: BitMatrix,
}

/// Build the edge matrix: `m[j][i]` iff an output of `j` reaches an input of `i`.
pub fn dependency_matrix(ics: &[IcTerminals], conn: &Connectivity) -> BitMatrix {
    let n = ics.len();
    let mut matrix = BitMatrix::new(n, n);
    for (j, driver) in ics.iter().enumerate() {
        for (i, reader) in ics.iter().enumerate() {
            let reaches = driver.outputs.iter().any(|&out| {
                reader
                    .inputs
                    .iter()
                    .any(|&input| conn.holes_connected(out, input))
            });
            if reaches {
                matrix.set(j, i);
            }
        }
    }
    matrix
}

pub fn sort_by_dependency(ics: &[IcTerminals], conn: &Connectivity) -> DependencyOrder {
    let n = ics.len();
    let matrix = dependency_matrix(ics, conn);
    let identity: Vec<usize> = (0..n).collect();
    let has_dependencies = matrix.count_ones() > 0;

    let mutual = (0..n).any(|j| matrix.row_ones(j).any(|i| matrix.get(i, j)));
    if mutual {
        return DependencyOrder {
            order: identity,
            has_dependencies,
            cyclic: true,
            matrix,
        };
    }

    let mut in_degree = vec![0usize; n];
    for j in 0..n {
        for i in matrix.row_ones(j) {
            in_degree[i] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for next in matrix.row_ones(node) {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() < n {
        return DependencyOrder {
            order: identity,
            has_dependencies,
            cyclic: true,
            matrix,
        };
    }

    DependencyOrder {
        order,
        has_dependencies,
        cyclic: false,
        matrix,
    }
}
