//! Simulation driver: settles the hole states of the powered breadboard.
//!
//! One call to [`Simulator::simulate`] runs a bounded number of *passes*.
//! Each pass starts from an all-`NoConnection` state array:
//!
//! 1. **Seed**: every supply wired to the board drives its terminal targets.
//! 2. **Evaluate**: ICs are evaluated in dependency order, each reading its
//!    pins from the live array and flooding its outputs, until a full round
//!    leaves the array unchanged or the iteration bound is hit.
//! 3. **Publish**: the array is written to the board and every LED and
//!    seven-segment display on it is refreshed.
//!
//! A board without IC dependencies settles in one pass. An acyclic board
//! stops as soon as a pass reproduces the previous one. A cyclic board
//! always runs the full bound, so oscillators never hang the caller.
//!
//! Connectivity and dependency order depend only on topology, so they are
//! cached per document and board, and reused until [`Circuit::revision`]
//! changes.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::component::{Component, Placement, SupplyTerminal};
use crate::connectivity::Connectivity;
use crate::dependency::{IcTerminals, sort_by_dependency};
use crate::id::ComponentId;
use crate::propagate::propagate;
use crate::state::{HoleState, HoleStates};

/// Default bound on both outer passes and inner evaluation rounds.
pub const MAX_ITERATIONS: u32 = 10;

// ---------------------------------------------------------------------------
// Configuration and reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Bound on outer passes and on inner rounds per pass. Values below 1
    /// are treated as 1.
    pub max_iterations: u32,
}

impl SimConfig {
    pub fn new() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
        }
    }

    fn bound(&self) -> u32 {
        self.max_iterations.max(1)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the simulator is within (or after) a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimPhase {
    Idle,
    Seeding,
    Evaluating,
    Converged,
    Oscillating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimOutcome {
    /// No breadboard is wired to a powered supply. Nothing was touched.
    Unpowered,
    /// The final pass is a fixed point of the board.
    Converged,
    /// The board has feedback and the pass bound was used up.
    Oscillating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimReport {
    pub outcome: SimOutcome,
    /// The board that was simulated.
    pub board: Option<ComponentId>,
    pub passes: u32,
    /// Inner evaluation rounds summed over all passes.
    pub rounds: u32,
    pub has_dependencies: bool,
    pub cyclic: bool,
    /// The last pass reproduced the one before it.
    pub settled: bool,
    /// IC evaluation order.
    pub order: Vec<ComponentId>,
}

impl SimReport {
    fn unpowered() -> Self {
        Self {
            outcome: SimOutcome::Unpowered,
            board: None,
            passes: 0,
            rounds: 0,
            has_dependencies: false,
            cyclic: false,
            settled: false,
            order: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Topology-derived data for one board of one document at one revision.
#[derive(Debug, Clone)]
struct BoardTopology {
    document: u64,
    board: ComponentId,
    revision: u64,
    connectivity: Connectivity,
    order: Vec<ComponentId>,
    has_dependencies: bool,
    cyclic: bool,
}

impl BoardTopology {
    fn resolve(circuit: &Circuit, board: ComponentId) -> Self {
        let connectivity = Connectivity::resolve(circuit, board);
        let ics = circuit.ics_on(board);
        let terminals: Vec<IcTerminals> = ics
            .iter()
            .map(|&id| match circuit.ic(id) {
                Ok(ic) => IcTerminals {
                    inputs: ic.input_holes(),
                    outputs: ic.output_holes(),
                },
                Err(_) => IcTerminals::default(),
            })
            .collect();
        let sorted = sort_by_dependency(&terminals, &connectivity);
        let order = sorted.order.iter().map(|&i| ics[i]).collect();

        log::debug!(
            "resolved board {board:?} at revision {}: {} ICs, dependencies={}, cyclic={}",
            circuit.revision(),
            ics.len(),
            sorted.has_dependencies,
            sorted.cyclic
        );

        Self {
            document: circuit.document(),
            board,
            revision: circuit.revision(),
            connectivity,
            order,
            has_dependencies: sorted.has_dependencies,
            cyclic: sorted.cyclic,
        }
    }

    fn matches(&self, circuit: &Circuit, board: ComponentId) -> bool {
        self.document == circuit.document()
            && self.board == board
            && self.revision == circuit.revision()
    }
}

/// Runs simulation passes and caches per-board topology between calls.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimConfig,
    phase: SimPhase,
    cache: Option<BoardTopology>,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            phase: SimPhase::Idle,
            cache: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// Drop the cached topology.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Board and revision the cached topology was built for.
    pub fn cached_for(&self) -> Option<(ComponentId, u64)> {
        self.cache.as_ref().map(|t| (t.board, t.revision))
    }

    /// Settle the first powered breadboard of `circuit`.
    ///
    /// With no powered board this is a no-op: hole states, LEDs and displays
    /// keep whatever they showed before.
    pub fn simulate(&mut self, circuit: &mut Circuit) -> SimReport {
        self.phase = SimPhase::Idle;

        let powered = circuit.powered_breadboards();
        let Some(&board) = powered.first() else {
            log::debug!("no powered breadboard, nothing to simulate");
            return SimReport::unpowered();
        };
        if powered.len() > 1 {
            log::warn!(
                "{} breadboards are powered; simulating only {board:?}",
                powered.len()
            );
        }

        let topology = match self.cache.take() {
            Some(t) if t.matches(circuit, board) => t,
            _ => BoardTopology::resolve(circuit, board),
        };

        let bound = self.config.bound();
        let mut previous: Option<HoleStates> = None;
        let mut passes = 0;
        let mut rounds = 0;
        let mut settled;

        loop {
            passes += 1;
            log::debug!("pass {passes} on {board:?} started");

            self.phase = SimPhase::Seeding;
            let mut states = HoleStates::new();
            seed_supplies(circuit, board, &topology.connectivity, &mut states);

            self.phase = SimPhase::Evaluating;
            rounds += evaluate_ics(circuit, &topology, &mut states, bound);

            settled = previous.as_ref() == Some(&states);
            publish(circuit, board, &states);
            log::trace!("pass {passes}: {}", states.to_trace_string());
            log::debug!("pass {passes} on {board:?} finished, settled={settled}");

            if !topology.has_dependencies {
                settled = true;
                break;
            }
            if (!topology.cyclic && settled) || passes >= bound {
                break;
            }
            previous = Some(states);
        }

        let outcome = if !topology.has_dependencies || (!topology.cyclic && settled) {
            SimOutcome::Converged
        } else {
            SimOutcome::Oscillating
        };
        self.phase = match outcome {
            SimOutcome::Oscillating => SimPhase::Oscillating,
            _ => SimPhase::Converged,
        };

        let report = SimReport {
            outcome,
            board: Some(board),
            passes,
            rounds,
            has_dependencies: topology.has_dependencies,
            cyclic: topology.cyclic,
            settled,
            order: topology.order.clone(),
        };
        self.cache = Some(topology);
        report
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

/// Run one simulation with the default configuration and no cache.
pub fn simulate(circuit: &mut Circuit) -> SimReport {
    Simulator::default().simulate(circuit)
}

// ---------------------------------------------------------------------------
// Pass steps
// ---------------------------------------------------------------------------

/// Drive every supply terminal wired to `board`, supplies in insertion order.
fn seed_supplies(
    circuit: &Circuit,
    board: ComponentId,
    conn: &Connectivity,
    states: &mut HoleStates,
) {
    for supply_id in circuit.supplies_wired_to(board) {
        let Ok(supply) = circuit.power_supply(supply_id) else {
            continue;
        };
        let targets = circuit.supply_targets(supply_id, board);
        for terminal in SupplyTerminal::ALL {
            if let Some(hole) = targets[terminal.number() as usize - 1] {
                propagate(hole, supply.output(terminal), states, conn);
            }
        }
    }
}

/// Evaluate ICs until a round changes nothing. Returns the rounds run.
fn evaluate_ics(
    circuit: &mut Circuit,
    topology: &BoardTopology,
    states: &mut HoleStates,
    bound: u32,
) -> u32 {
    if topology.order.is_empty() {
        return 0;
    }
    for round in 1..=bound {
        let before = states.clone();
        for &id in &topology.order {
            let Some(Component::Ic(ic)) = circuit.get_mut(id) else {
                continue;
            };
            let pins: Vec<HoleState> = ic.holes().iter().map(|&h| states.get(h)).collect();
            let driven = ic.chip_mut().evaluate(&pins);
            let datasheet = ic.chip().datasheet();
            for (index, (&hole, &state)) in ic.holes().iter().zip(&driven).enumerate() {
                if !datasheet.is_input(index as u8 + 1) {
                    propagate(hole, state, states, &topology.connectivity);
                }
            }
        }
        if *states == before {
            log::trace!("ICs settled after {round} rounds");
            return round;
        }
    }
    log::trace!("IC rounds hit the bound of {bound}");
    bound
}

/// Store `states` on the board and refresh the displays mounted on it.
fn publish(circuit: &mut Circuit, board: ComponentId, states: &HoleStates) {
    if let Some(Component::Breadboard(b)) = circuit.get_mut(board) {
        b.set_hole_states(states.clone());
    }
    let displays: Vec<ComponentId> = circuit
        .mounted_on(board)
        .filter(|(_, c)| matches!(c, Component::Led(_) | Component::SevenSegment(_)))
        .map(|(id, _)| id)
        .collect();
    for id in displays {
        match circuit.get_mut(id) {
            Some(Component::Led(led)) => led.update(states),
            Some(Component::SevenSegment(seg)) => seg.update(states),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn unpowered_circuit_is_untouched() {
        let mut bench = powered_bench();
        bench.set_power(false);
        let report = simulate(&mut bench.circuit);
        assert_eq!(report.outcome, SimOutcome::Unpowered);
        assert_eq!(report.passes, 0);
        assert_eq!(bench.state(1), HoleState::NoConnection);
    }

    #[test]
    fn supplies_alone_settle_in_one_pass() {
        let mut bench = powered_bench();
        let report = simulate(&mut bench.circuit);
        assert_eq!(report.outcome, SimOutcome::Converged);
        assert_eq!(report.passes, 1);
        assert_eq!(report.rounds, 0);
        assert_eq!(bench.state(25), HoleState::High);
        assert_eq!(bench.state(50), HoleState::Low);
        assert_eq!(bench.state(51), HoleState::NoConnection);
    }

    #[test]
    fn and_gate_follows_its_inputs() {
        let mut bench = powered_bench();
        bench.add_ic(520, and_gate_datasheet());
        // Pin 1 column via 583, pin 2 column via 584, pin 3 read at 585.
        bench.wire(VCC_HOLE + 1, 583);
        bench.wire(VCC_HOLE + 2, 584);
        simulate(&mut bench.circuit);
        assert_eq!(bench.state(585), HoleState::High);

        let mut bench = powered_bench();
        bench.add_ic(520, and_gate_datasheet());
        bench.wire(VCC_HOLE + 1, 583);
        bench.wire(GND_HOLE + 1, 584);
        simulate(&mut bench.circuit);
        assert_eq!(bench.state(585), HoleState::Low);
    }

    #[test]
    fn chained_gates_converge_in_two_passes() {
        let mut bench = powered_bench();
        let first = bench.add_ic(520, and_gate_datasheet());
        let second = bench.add_ic(540, and_gate_datasheet());
        bench.wire(VCC_HOLE + 1, 583);
        bench.wire(VCC_HOLE + 2, 584);
        // First output (column 70) into second pin 1 (column 88).
        bench.wire(585, 603);
        bench.wire(VCC_HOLE + 3, 604);

        let report = simulate(&mut bench.circuit);
        assert_eq!(report.outcome, SimOutcome::Converged);
        assert!(report.has_dependencies);
        assert!(!report.cyclic);
        assert_eq!(report.passes, 2);
        assert!(report.settled);
        assert_eq!(report.order, vec![first, second]);
        assert_eq!(bench.state(605), HoleState::High);
    }

    #[test]
    fn dependency_order_overrides_insertion_order() {
        let mut bench = powered_bench();
        let reader = bench.add_ic(540, and_gate_datasheet());
        let driver = bench.add_ic(520, and_gate_datasheet());
        bench.wire(VCC_HOLE + 1, 583);
        bench.wire(VCC_HOLE + 2, 584);
        bench.wire(585, 603);
        bench.wire(VCC_HOLE + 3, 604);

        let report = simulate(&mut bench.circuit);
        assert_eq!(report.order, vec![driver, reader]);
        assert_eq!(bench.state(605), HoleState::High);
    }

    #[test]
    fn latch_runs_the_full_bound() {
        let mut bench = sr_latch_bench();
        bench.wire(GND_HOLE + 1, LATCH_SET);
        bench.wire(VCC_HOLE + 1, LATCH_RESET);

        let report = simulate(&mut bench.circuit);
        assert_eq!(report.outcome, SimOutcome::Oscillating);
        assert!(report.cyclic);
        assert_eq!(report.passes, MAX_ITERATIONS);
        assert!(report.settled);
        assert_eq!(bench.state(LATCH_Q), HoleState::High);
        assert_eq!(bench.state(LATCH_Q_BAR), HoleState::Low);
    }

    #[test]
    fn bound_is_configurable() {
        let mut bench = sr_latch_bench();
        bench.wire(VCC_HOLE + 1, LATCH_SET);
        bench.wire(GND_HOLE + 1, LATCH_RESET);

        let mut sim = Simulator::new(SimConfig { max_iterations: 3 });
        let report = sim.simulate(&mut bench.circuit);
        assert_eq!(report.passes, 3);
        assert_eq!(sim.phase(), SimPhase::Oscillating);
        assert_eq!(bench.state(LATCH_Q), HoleState::Low);
        assert_eq!(bench.state(LATCH_Q_BAR), HoleState::High);
    }

    #[test]
    fn zero_bound_still_runs_one_pass() {
        let mut bench = sr_latch_bench();
        let mut sim = Simulator::new(SimConfig { max_iterations: 0 });
        assert_eq!(sim.simulate(&mut bench.circuit).passes, 1);
    }

    #[test]
    fn simulate_is_idempotent() {
        let mut bench = sr_latch_bench();
        bench.wire(GND_HOLE + 1, LATCH_SET);
        bench.wire(VCC_HOLE + 1, LATCH_RESET);
        let mut sim = Simulator::default();
        sim.simulate(&mut bench.circuit);
        let first = bench.states().clone();
        sim.simulate(&mut bench.circuit);
        assert_eq!(bench.states(), &first);
    }

    #[test]
    fn led_lights_when_forward_biased() {
        let mut bench = powered_bench();
        // Anode 300 (column 37), cathode 299 (column 36).
        let led = bench.circuit.add_led(bench.board, hole(300)).unwrap();
        bench.wire(VCC_HOLE + 1, 363);
        bench.wire(GND_HOLE + 1, 362);
        simulate(&mut bench.circuit);
        assert!(bench.circuit.led_is_on(led).unwrap());

        bench.set_power(false);
        simulate(&mut bench.circuit);
        assert!(bench.circuit.led_is_on(led).unwrap());
        bench.circuit.clear_hole_states();
        assert!(!bench.circuit.led_is_on(led).unwrap());
    }

    #[test]
    fn topology_is_cached_until_an_edit() {
        let mut bench = powered_bench();
        let mut sim = Simulator::default();
        sim.simulate(&mut bench.circuit);
        let cached = sim.cached_for();
        assert_eq!(cached, Some((bench.board, bench.circuit.revision())));

        bench.circuit.power_supply_mut(bench.supply).unwrap().set_clock_enabled(true);
        sim.simulate(&mut bench.circuit);
        assert_eq!(sim.cached_for(), cached);

        bench.wire(VCC_HOLE + 1, 583);
        sim.simulate(&mut bench.circuit);
        assert_eq!(sim.cached_for(), Some((bench.board, bench.circuit.revision())));
        assert_eq!(bench.state(583), HoleState::High);

        sim.invalidate();
        assert_eq!(sim.cached_for(), None);
    }

    #[test]
    fn cache_is_not_shared_between_diverged_clones() {
        let base = powered_bench();
        let mut a = base.clone();
        let mut b = base.clone();
        a.wire(VCC_HOLE + 1, 583);
        b.wire(VCC_HOLE + 1, 600);
        assert_eq!(a.circuit.revision(), b.circuit.revision());
        assert_ne!(a.circuit.document(), b.circuit.document());

        let mut sim = Simulator::default();
        sim.simulate(&mut a.circuit);
        sim.simulate(&mut b.circuit);
        assert_eq!(b.state(600), HoleState::High);
        assert_eq!(b.state(583), HoleState::NoConnection);
    }

    #[test]
    fn cache_is_not_reused_for_a_loaded_snapshot() {
        use crate::serialize::{load_circuit, save_circuit};

        let mut saved = powered_bench();
        let bytes = save_circuit(&saved.circuit).unwrap();
        saved.wire(VCC_HOLE + 1, 583);
        let mut sim = Simulator::default();
        sim.simulate(&mut saved.circuit);

        // Same board id, and the loaded copy can catch up to the same revision.
        let mut loaded = load_circuit(&bytes).unwrap();
        loaded
            .connect_holes(saved.board, hole(VCC_HOLE + 1), hole(600))
            .unwrap();
        assert_eq!(loaded.revision(), saved.circuit.revision());
        sim.simulate(&mut loaded);
        assert_eq!(loaded.hole_state(saved.board, hole(600)).unwrap(), HoleState::High);
        assert_eq!(
            loaded.hole_state(saved.board, hole(583)).unwrap(),
            HoleState::NoConnection
        );
    }

    #[test]
    fn unpowered_supply_still_drives_no_connection() {
        let mut bench = powered_bench();
        let idle = bench.circuit.add_power_supply();
        // The idle supply's VCC lands on the same rail row after the live one.
        bench
            .circuit
            .connect_supply(idle, SupplyTerminal::Vcc, bench.board, hole(VCC_HOLE + 5))
            .unwrap();
        simulate(&mut bench.circuit);
        assert_eq!(bench.state(VCC_HOLE), HoleState::NoConnection);
    }

    #[test]
    fn first_powered_board_wins() {
        let mut bench = powered_bench();
        let other = bench.circuit.add_breadboard();
        bench
            .circuit
            .connect_supply(bench.supply, SupplyTerminal::Clk, other, hole(1))
            .unwrap();
        let report = simulate(&mut bench.circuit);
        assert_eq!(report.board, Some(bench.board));
        assert_eq!(
            bench.circuit.hole_state(other, hole(1)).unwrap(),
            HoleState::NoConnection
        );
    }
}
