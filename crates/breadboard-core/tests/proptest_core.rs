//! Property-based tests for the breadboard core.
//!
//! Uses proptest to generate random wiring on a powered board, then checks
//! the invariants the renderer relies on.

use breadboard_core::connectivity::Connectivity;
use breadboard_core::sim::{SimOutcome, simulate};
use breadboard_core::test_utils::*;
use breadboard_core::topology::{
    ColumnId, HoleId, MAX_HOLES, RowId, holes_in_column, holes_in_row, is_in_power_rail,
};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_hole() -> impl Strategy<Value = u16> {
    1..=MAX_HOLES as u16
}

fn arb_links(max: usize) -> impl Strategy<Value = Vec<(u16, u16)>> {
    proptest::collection::vec((arb_hole(), arb_hole()), 0..=max)
}

/// A powered bench plus random wires and up to two AND gates. Wires that
/// cannot be placed are skipped.
fn arb_bench() -> impl Strategy<Value = Bench> {
    (arb_links(24), any::<bool>(), any::<bool>()).prop_map(|(links, first, second)| {
        let mut bench = powered_bench();
        if first {
            bench
                .circuit
                .add_ic(bench.board, hole(520), and_gate_datasheet())
                .ok();
        }
        if second {
            bench
                .circuit
                .add_ic(bench.board, hole(540), and_gate_datasheet())
                .ok();
        }
        for (a, b) in links {
            bench.circuit.connect_holes(bench.board, hole(a), hole(b)).ok();
        }
        bench
    })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn simulate_is_idempotent(mut bench in arb_bench()) {
        simulate(&mut bench.circuit);
        let first = bench.states().clone();
        simulate(&mut bench.circuit);
        prop_assert_eq!(bench.states(), &first);
    }

    #[test]
    fn groups_are_uniform_after_simulate(mut bench in arb_bench()) {
        let report = simulate(&mut bench.circuit);
        prop_assert_ne!(report.outcome, SimOutcome::Unpowered);
        let states = bench.states();
        for row in RowId::all() {
            let holes = holes_in_row(row);
            prop_assert!(holes.iter().all(|h| states[*h] == states[holes[0]]));
        }
        for column in ColumnId::all() {
            let holes = holes_in_column(column);
            prop_assert!(holes.iter().all(|h| states[*h] == states[holes[0]]));
        }
    }

    #[test]
    fn connectivity_is_an_equivalence(
        links in arb_links(16),
        a in arb_hole(),
        b in arb_hole(),
        c in arb_hole(),
    ) {
        let links: Vec<(HoleId, HoleId)> =
            links.into_iter().map(|(x, y)| (hole(x), hole(y))).collect();
        let conn = Connectivity::from_links(&links);
        let (a, b, c) = (hole(a), hole(b), hole(c));
        prop_assert!(conn.holes_connected(a, a));
        prop_assert_eq!(conn.holes_connected(a, b), conn.holes_connected(b, a));
        if conn.holes_connected(a, b) && conn.holes_connected(b, c) {
            prop_assert!(conn.holes_connected(a, c));
        }
        if conn.holes_adjacent(a, b) {
            prop_assert!(conn.holes_connected(a, b));
        }
        prop_assert!(conn.row_matrix().is_symmetric());
        prop_assert!(conn.column_matrix().is_symmetric());
    }

    #[test]
    fn every_hole_belongs_to_exactly_one_group(raw in arb_hole()) {
        let h = hole(raw);
        let in_rows = RowId::all().filter(|r| holes_in_row(*r).contains(&h)).count();
        let in_columns = ColumnId::all().filter(|c| holes_in_column(*c).contains(&h)).count();
        prop_assert_eq!(in_rows + in_columns, 1);
        prop_assert_eq!(in_rows == 1, is_in_power_rail(h));
    }

    #[test]
    fn hole_ids_outside_the_board_are_rejected(raw in 831u16..) {
        prop_assert!(HoleId::new(raw).is_err());
    }
}
