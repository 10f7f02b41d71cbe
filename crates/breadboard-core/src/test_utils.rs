//! Shared builders for tests and benchmarks.
//!
//! Enabled for this crate's own tests and, through the `test-utils`
//! feature, for other crates' tests.

use crate::circuit::Circuit;
use crate::component::SupplyTerminal;
use crate::ic::{Cell, Column, ConditionTable, Datasheet, PinDirection};
use crate::id::{ComponentId, WireId};
use crate::state::{HoleState, HoleStates};
use crate::topology::HoleId;

/// Shorthand for a known-valid hole number.
pub fn hole(raw: u16) -> HoleId {
    HoleId::new(raw).expect("test hole out of range")
}

// ---------------------------------------------------------------------------
// Datasheets
// ---------------------------------------------------------------------------

/// Gate pin triples (a, b, y) of the 74xx quad two-input packages.
pub const QUAD_GATES: [(u8, u8, u8); 4] = [(1, 2, 3), (4, 5, 6), (9, 10, 8), (12, 13, 11)];

/// 14-pin quad two-input gate. `rows` lists `[a, b, y]` rows, applied to
/// each of the four gates.
pub fn quad_gate_datasheet(name: &str, rows: &[[Cell; 3]]) -> Datasheet {
    let mut pins = vec![PinDirection::Input; 14];
    for (_, _, y) in QUAD_GATES {
        pins[y as usize - 1] = PinDirection::Output;
    }
    let tables = QUAD_GATES
        .iter()
        .map(|&(a, b, y)| ConditionTable {
            columns: vec![Column::Pin(a), Column::Pin(b), Column::Pin(y)],
            rows: rows.iter().map(|r| r.to_vec()).collect(),
        })
        .collect();
    Datasheet {
        name: name.into(),
        description: String::new(),
        label: name.into(),
        pin_count: 14,
        pins,
        storage: None,
        tables,
    }
}

/// 7408: quad two-input AND. Outputs on pins 3, 6, 8 and 11.
pub fn and_gate_datasheet() -> Datasheet {
    use crate::ic::Cell::{DontCare as X, High as H, Low as L};
    quad_gate_datasheet("7408", &[[H, H, H], [L, X, L], [X, L, L]])
}

/// 7400: quad two-input NAND.
pub fn nand_gate_datasheet() -> Datasheet {
    use crate::ic::Cell::{DontCare as X, High as H, Low as L};
    quad_gate_datasheet("7400", &[[H, H, L], [L, X, H], [X, L, H]])
}

// ---------------------------------------------------------------------------
// Benches
// ---------------------------------------------------------------------------

/// Power-rail hole the bench supply's VCC is wired to (rail row 1).
pub const VCC_HOLE: u16 = 1;
/// Power-rail hole the bench supply's GND is wired to (rail row 2).
pub const GND_HOLE: u16 = 26;

/// One breadboard with one powered supply feeding rail rows 1 and 2.
#[derive(Debug, Clone)]
pub struct Bench {
    pub circuit: Circuit,
    pub board: ComponentId,
    pub supply: ComponentId,
}

impl Bench {
    pub fn wire(&mut self, a: u16, b: u16) -> WireId {
        self.circuit
            .connect_holes(self.board, hole(a), hole(b))
            .expect("bench wire")
    }

    pub fn add_ic(&mut self, pin1: u16, datasheet: Datasheet) -> ComponentId {
        self.circuit
            .add_ic(self.board, hole(pin1), datasheet)
            .expect("bench IC")
    }

    pub fn set_power(&mut self, on: bool) {
        self.circuit
            .power_supply_mut(self.supply)
            .expect("bench supply")
            .set_powered(on);
    }

    pub fn state(&self, raw: u16) -> HoleState {
        self.states()[hole(raw)]
    }

    pub fn states(&self) -> &HoleStates {
        self.circuit
            .breadboard(self.board)
            .expect("bench board")
            .hole_states()
    }
}

pub fn powered_bench() -> Bench {
    let mut circuit = Circuit::new();
    let board = circuit.add_breadboard();
    let supply = circuit.add_power_supply();
    circuit
        .connect_supply(supply, SupplyTerminal::Vcc, board, hole(VCC_HOLE))
        .expect("vcc wire");
    circuit
        .connect_supply(supply, SupplyTerminal::Gnd, board, hole(GND_HOLE))
        .expect("gnd wire");
    let mut bench = Bench {
        circuit,
        board,
        supply,
    };
    bench.set_power(true);
    bench
}

/// Set input (active low) of the latch: first NAND, pin 1.
pub const LATCH_SET: u16 = 583;
/// Reset input (active low) of the latch: second NAND, pin 1.
pub const LATCH_RESET: u16 = 603;
/// Output of the first NAND.
pub const LATCH_Q: u16 = 585;
/// Output of the second NAND.
pub const LATCH_Q_BAR: u16 = 605;

/// SR latch from two cross-coupled 7400s at pins 520 and 540. The set and
/// reset inputs are left for the test to wire.
pub fn sr_latch_bench() -> Bench {
    let mut bench = powered_bench();
    bench.add_ic(520, nand_gate_datasheet());
    bench.add_ic(540, nand_gate_datasheet());
    // Q (column 70) to the second gate's pin 2 (column 89).
    bench.wire(648, 667);
    // /Q (column 90) to the first gate's pin 2 (column 69).
    bench.wire(668, 647);
    bench
}
