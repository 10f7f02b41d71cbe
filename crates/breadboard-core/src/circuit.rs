//! The circuit document: components, wires, and the rules for adding them.
//!
//! Components and wires live in slotmaps with a side vector recording
//! insertion order, so every iteration over the document is deterministic.
//! Each topology mutation bumps [`Circuit::revision`], which is what the
//! simulator keys its connectivity cache on.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};

use crate::component::*;
use crate::ic::{Datasheet, DatasheetError, IcChip};
use crate::id::{ComponentId, WireId};
use crate::state::{HoleState, HoleStates};
use crate::topology::{HoleId, TopologyError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CircuitError {
    #[error("component not found: {0:?}")]
    ComponentNotFound(ComponentId),
    #[error("wire not found: {0:?}")]
    WireNotFound(WireId),
    #[error("component {id:?} is a {found:?}, expected a {expected:?}")]
    WrongKind {
        id: ComponentId,
        expected: ComponentKind,
        found: ComponentKind,
    },
    #[error("breadboard {0:?} still carries {1} components")]
    BoardInUse(ComponentId, usize),
    #[error("terminal {0:?} already has a wire")]
    TerminalInUse(SupplyTerminal),
    #[error("a wire cannot start and end at the same point")]
    SameEndpoint,
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Datasheet(#[from] DatasheetError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

// ---------------------------------------------------------------------------
// Wires
// ---------------------------------------------------------------------------

/// One end of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireEnd {
    Board { board: ComponentId, hole: HoleId },
    Supply { supply: ComponentId, terminal: SupplyTerminal },
}

impl WireEnd {
    pub fn component(&self) -> ComponentId {
        match *self {
            WireEnd::Board { board, .. } => board,
            WireEnd::Supply { supply, .. } => supply,
        }
    }

    /// The hole, if this end is on `board`.
    pub fn hole_on(&self, on: ComponentId) -> Option<HoleId> {
        match *self {
            WireEnd::Board { board, hole } if board == on => Some(hole),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub source: WireEnd,
    pub sink: WireEnd,
}

impl Wire {
    pub fn ends(&self) -> [WireEnd; 2] {
        [self.source, self.sink]
    }

    pub fn touches(&self, id: ComponentId) -> bool {
        self.source.component() == id || self.sink.component() == id
    }

    /// Both holes, if both ends are on `board`.
    pub fn holes_on(&self, board: ComponentId) -> Option<(HoleId, HoleId)> {
        Some((self.source.hole_on(board)?, self.sink.hole_on(board)?))
    }
}

// ---------------------------------------------------------------------------
// Circuit
// ---------------------------------------------------------------------------

static NEXT_DOCUMENT: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one document. A new, cloned or loaded circuit
/// always gets a fresh one, so ids and revisions from another document can
/// never be mistaken for its own.
#[derive(Debug, PartialEq, Eq, Hash)]
struct DocumentId(u64);

impl Default for DocumentId {
    fn default() -> Self {
        DocumentId(NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Clone for DocumentId {
    fn clone(&self) -> Self {
        Self::default()
    }
}

/// An editable circuit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Circuit {
    #[serde(skip)]
    document: DocumentId,
    components: SlotMap<ComponentId, Component>,
    names: SecondaryMap<ComponentId, String>,
    order: Vec<ComponentId>,
    wires: SlotMap<WireId, Wire>,
    wire_order: Vec<WireId>,
    name_counters: BTreeMap<String, u32>,
    revision: u64,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incremented on every change to components or wires.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Identity of this document within the process. Differs between a
    /// circuit and its clones, and between a saved and a loaded circuit.
    pub fn document(&self) -> u64 {
        self.document.0
    }

    // -----------------------------------------------------------------------
    // Insertion
    // -----------------------------------------------------------------------

    fn insert(&mut self, component: Component, prefix: &str) -> ComponentId {
        let counter = self.name_counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        let name = format!("{prefix}_{counter}");
        let id = self.components.insert(component);
        self.names.insert(id, name);
        self.order.push(id);
        self.revision += 1;
        id
    }

    pub fn add_breadboard(&mut self) -> ComponentId {
        self.insert(
            Component::Breadboard(Breadboard::new()),
            ComponentKind::Breadboard.name_prefix(),
        )
    }

    pub fn add_power_supply(&mut self) -> ComponentId {
        self.insert(
            Component::PowerSupply(PowerSupply::new()),
            ComponentKind::PowerSupply.name_prefix(),
        )
    }

    pub fn add_resistor(
        &mut self,
        board: ComponentId,
        source: HoleId,
        sink: HoleId,
        ohms: u32,
    ) -> Result<ComponentId, CircuitError> {
        self.breadboard(board)?;
        let resistor = Resistor::new(board, source, sink, ohms)?;
        self.check_unblocked(board, resistor.holes())?;
        Ok(self.insert(
            Component::Resistor(resistor),
            ComponentKind::Resistor.name_prefix(),
        ))
    }

    pub fn add_led(
        &mut self,
        board: ComponentId,
        anode: HoleId,
    ) -> Result<ComponentId, CircuitError> {
        self.breadboard(board)?;
        let led = Led::new(board, anode)?;
        self.check_unblocked(board, led.holes())?;
        Ok(self.insert(Component::Led(led), ComponentKind::Led.name_prefix()))
    }

    /// Build a chip from `datasheet` and mount it with pin 1 at `pin1`.
    pub fn add_ic(
        &mut self,
        board: ComponentId,
        pin1: HoleId,
        datasheet: Datasheet,
    ) -> Result<ComponentId, CircuitError> {
        self.breadboard(board)?;
        let chip = IcChip::new(datasheet)?;
        let ic = Ic::new(board, pin1, chip)?;
        self.check_free(board, &ic.shadowed_holes())?;
        let prefix = ic.chip().name().to_string();
        Ok(self.insert(Component::Ic(ic), &prefix))
    }

    pub fn add_seven_segment(
        &mut self,
        board: ComponentId,
        top_left: HoleId,
        common_cathode: bool,
    ) -> Result<ComponentId, CircuitError> {
        self.breadboard(board)?;
        let display = SevenSegment::new(board, top_left, common_cathode)?;
        self.check_free(board, &display.shadowed_holes())?;
        Ok(self.insert(
            Component::SevenSegment(display),
            ComponentKind::SevenSegment.name_prefix(),
        ))
    }

    /// Run a wire between two points. Neither may already carry a lead;
    /// holes under a part's body are fine.
    pub fn connect(&mut self, source: WireEnd, sink: WireEnd) -> Result<WireId, CircuitError> {
        if source == sink {
            return Err(CircuitError::SameEndpoint);
        }
        for end in [source, sink] {
            match end {
                WireEnd::Board { board, hole } => {
                    self.breadboard(board)?;
                    self.check_unblocked(board, &[hole])?;
                }
                WireEnd::Supply { supply, terminal } => {
                    self.power_supply(supply)?;
                    if self.is_terminal_blocked(supply, terminal) {
                        return Err(CircuitError::TerminalInUse(terminal));
                    }
                }
            }
        }
        let id = self.wires.insert(Wire { source, sink });
        self.wire_order.push(id);
        self.revision += 1;
        Ok(id)
    }

    /// Wire a supply terminal to a breadboard hole.
    pub fn connect_supply(
        &mut self,
        supply: ComponentId,
        terminal: SupplyTerminal,
        board: ComponentId,
        hole: HoleId,
    ) -> Result<WireId, CircuitError> {
        self.connect(
            WireEnd::Supply { supply, terminal },
            WireEnd::Board { board, hole },
        )
    }

    /// Wire two holes on the same breadboard.
    pub fn connect_holes(
        &mut self,
        board: ComponentId,
        a: HoleId,
        b: HoleId,
    ) -> Result<WireId, CircuitError> {
        self.connect(
            WireEnd::Board { board, hole: a },
            WireEnd::Board { board, hole: b },
        )
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    pub fn remove_wire(&mut self, id: WireId) -> Result<Wire, CircuitError> {
        let wire = self.wires.remove(id).ok_or(CircuitError::WireNotFound(id))?;
        self.wire_order.retain(|w| *w != id);
        self.revision += 1;
        Ok(wire)
    }

    /// Remove a component along with every wire attached to it.
    ///
    /// A breadboard can only be removed once nothing is mounted on it.
    /// Returns the ids of the removed wires.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Vec<WireId>, CircuitError> {
        let component = self.get(id).ok_or(CircuitError::ComponentNotFound(id))?;
        if component.kind() == ComponentKind::Breadboard {
            let mounted = self.mounted_on(id).count();
            if mounted > 0 {
                return Err(CircuitError::BoardInUse(id, mounted));
            }
        }

        let attached: Vec<WireId> = self
            .wires()
            .filter(|(_, w)| w.touches(id))
            .map(|(wid, _)| wid)
            .collect();
        for wid in &attached {
            self.wires.remove(*wid);
        }
        self.wire_order.retain(|w| !attached.contains(w));

        self.components.remove(id);
        self.names.remove(id);
        self.order.retain(|c| *c != id);
        self.revision += 1;
        Ok(attached)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }

    pub fn name(&self, id: ComponentId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ComponentId> {
        self.order.iter().copied().find(|id| self.name(*id) == Some(name))
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(id)
    }

    pub fn component_count(&self) -> usize {
        self.order.len()
    }

    pub fn wire_count(&self) -> usize {
        self.wire_order.len()
    }

    /// Components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> + '_ {
        self.order.iter().map(|id| (*id, &self.components[*id]))
    }

    /// Wires in insertion order.
    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> + '_ {
        self.wire_order.iter().map(|id| (*id, &self.wires[*id]))
    }

    pub fn breadboards(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.ids_of(ComponentKind::Breadboard)
    }

    pub fn power_supplies(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.ids_of(ComponentKind::PowerSupply)
    }

    fn ids_of(&self, kind: ComponentKind) -> impl Iterator<Item = ComponentId> + '_ {
        self.components()
            .filter(move |(_, c)| c.kind() == kind)
            .map(|(id, _)| id)
    }

    /// Parts mounted on `board`, in insertion order.
    pub fn mounted_on(
        &self,
        board: ComponentId,
    ) -> impl Iterator<Item = (ComponentId, &Component)> + '_ {
        self.components().filter(move |(_, c)| c.base() == Some(board))
    }

    /// ICs mounted on `board`, in insertion order.
    pub fn ics_on(&self, board: ComponentId) -> Vec<ComponentId> {
        self.mounted_on(board)
            .filter(|(_, c)| c.kind() == ComponentKind::Ic)
            .map(|(id, _)| id)
            .collect()
    }

    fn wrong_kind(&self, id: ComponentId, expected: ComponentKind) -> CircuitError {
        match self.get(id) {
            Some(c) => CircuitError::WrongKind {
                id,
                expected,
                found: c.kind(),
            },
            None => CircuitError::ComponentNotFound(id),
        }
    }

    pub fn breadboard(&self, id: ComponentId) -> Result<&Breadboard, CircuitError> {
        match self.get(id) {
            Some(Component::Breadboard(b)) => Ok(b),
            _ => Err(self.wrong_kind(id, ComponentKind::Breadboard)),
        }
    }

    pub fn power_supply(&self, id: ComponentId) -> Result<&PowerSupply, CircuitError> {
        match self.get(id) {
            Some(Component::PowerSupply(ps)) => Ok(ps),
            _ => Err(self.wrong_kind(id, ComponentKind::PowerSupply)),
        }
    }

    /// Supply controls (power, clock, frequency) do not change topology and
    /// leave the revision alone.
    pub fn power_supply_mut(&mut self, id: ComponentId) -> Result<&mut PowerSupply, CircuitError> {
        if !matches!(self.get(id), Some(Component::PowerSupply(_))) {
            return Err(self.wrong_kind(id, ComponentKind::PowerSupply));
        }
        match self.components.get_mut(id) {
            Some(Component::PowerSupply(ps)) => Ok(ps),
            _ => Err(CircuitError::ComponentNotFound(id)),
        }
    }

    pub fn ic(&self, id: ComponentId) -> Result<&Ic, CircuitError> {
        match self.get(id) {
            Some(Component::Ic(ic)) => Ok(ic),
            _ => Err(self.wrong_kind(id, ComponentKind::Ic)),
        }
    }

    pub fn led(&self, id: ComponentId) -> Result<&Led, CircuitError> {
        match self.get(id) {
            Some(Component::Led(led)) => Ok(led),
            _ => Err(self.wrong_kind(id, ComponentKind::Led)),
        }
    }

    pub fn seven_segment(&self, id: ComponentId) -> Result<&SevenSegment, CircuitError> {
        match self.get(id) {
            Some(Component::SevenSegment(s)) => Ok(s),
            _ => Err(self.wrong_kind(id, ComponentKind::SevenSegment)),
        }
    }

    // -----------------------------------------------------------------------
    // Rendering queries
    // -----------------------------------------------------------------------

    pub fn hole_state(&self, board: ComponentId, hole: HoleId) -> Result<HoleState, CircuitError> {
        Ok(self.breadboard(board)?.hole_state(hole))
    }

    pub fn led_is_on(&self, id: ComponentId) -> Result<bool, CircuitError> {
        Ok(self.led(id)?.is_on())
    }

    pub fn segment_is_on(&self, id: ComponentId, segment: Segment) -> Result<bool, CircuitError> {
        Ok(self.seven_segment(id)?.is_on(segment))
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    /// Whether a wire end or a mounted pin already uses `hole` on `board`.
    pub fn is_hole_blocked(&self, board: ComponentId, hole: HoleId) -> bool {
        self.wires()
            .any(|(_, w)| w.ends().iter().any(|e| e.hole_on(board) == Some(hole)))
            || self
                .mounted_on(board)
                .filter_map(|(_, c)| c.placement())
                .any(|p| p.is_hole_occupied(hole))
    }

    /// Whether `hole` is blocked or lies under the body of a part on `board`.
    pub fn is_hole_shadowed(&self, board: ComponentId, hole: HoleId) -> bool {
        self.is_hole_blocked(board, hole)
            || self
                .mounted_on(board)
                .filter_map(|(_, c)| c.placement())
                .any(|p| p.shadowed_holes().contains(&hole))
    }

    pub fn is_terminal_blocked(&self, supply: ComponentId, terminal: SupplyTerminal) -> bool {
        self.wires().any(|(_, w)| {
            w.ends()
                .contains(&WireEnd::Supply { supply, terminal })
        })
    }

    /// Leads of wires, resistors and LEDs only need unused holes.
    fn check_unblocked(&self, board: ComponentId, holes: &[HoleId]) -> Result<(), PlacementError> {
        match holes.iter().find(|h| self.is_hole_blocked(board, **h)) {
            Some(&hole) => Err(PlacementError::Blocked(hole)),
            None => Ok(()),
        }
    }

    /// Package footprints must also stay clear of other bodies.
    fn check_free(&self, board: ComponentId, holes: &[HoleId]) -> Result<(), PlacementError> {
        for &hole in holes {
            if self.is_hole_blocked(board, hole) {
                return Err(PlacementError::Blocked(hole));
            }
            if self.is_hole_shadowed(board, hole) {
                return Err(PlacementError::Shadowed(hole));
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Power queries
    // -----------------------------------------------------------------------

    /// Supplies with at least one wire to `board`, in order, powered or not.
    pub fn supplies_wired_to(&self, board: ComponentId) -> Vec<ComponentId> {
        self.power_supplies()
            .filter(|ps| {
                self.wires().any(|(_, w)| {
                    w.touches(*ps) && w.ends().iter().any(|e| e.hole_on(board).is_some())
                })
            })
            .collect()
    }

    /// Breadboards wired directly to a powered-on supply, in order.
    pub fn powered_breadboards(&self) -> Vec<ComponentId> {
        self.breadboards()
            .filter(|b| {
                self.supplies_wired_to(*b)
                    .into_iter()
                    .any(|ps| matches!(self.power_supply(ps), Ok(p) if p.is_powered()))
            })
            .collect()
    }

    /// Reset every board to `NoConnection` and switch every display off.
    pub fn clear_hole_states(&mut self) {
        for id in self.order.clone() {
            match self.components.get_mut(id) {
                Some(Component::Breadboard(b)) => b.set_hole_states(HoleStates::new()),
                Some(Component::Led(led)) => led.turn_off(),
                Some(Component::SevenSegment(seg)) => seg.turn_off(),
                _ => {}
            }
        }
    }

    /// The board hole each terminal of `supply` is wired to. When several
    /// wires leave one terminal for `board`, the last one wins.
    pub fn supply_targets(&self, supply: ComponentId, board: ComponentId) -> [Option<HoleId>; 3] {
        let mut targets = [None; 3];
        for (_, wire) in self.wires() {
            for (here, there) in [(wire.source, wire.sink), (wire.sink, wire.source)] {
                if let (WireEnd::Supply { supply: s, terminal }, Some(hole)) =
                    (here, there.hole_on(board))
                    && s == supply
                {
                    targets[terminal.number() as usize - 1] = Some(hole);
                }
            }
        }
        targets
    }

    /// Direct hole-to-hole links on `board`: wires with both ends on it,
    /// then resistors mounted on it.
    pub fn links_on(&self, board: ComponentId) -> Vec<(HoleId, HoleId)> {
        let wires = self.wires().filter_map(|(_, w)| w.holes_on(board));
        let resistors = self.mounted_on(board).filter_map(|(_, c)| match c {
            Component::Resistor(r) => Some((r.source(), r.sink())),
            _ => None,
        });
        wires.chain(resistors).collect()
    }
}
