//! Circuit components and their footprints.
//!
//! Every component is a variant of [`Component`]. The parts mounted on a
//! breadboard (resistors, ICs, LEDs, 7-segment displays) implement
//! [`Placement`], which exposes the holes they occupy and the holes their
//! body shadows. Footprint geometry is computed here. Checks against other
//! parts on the same board live in [`crate::circuit`].

use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed64, f64_to_fixed64};
use crate::ic::{IcChip, PinDirection};
use crate::id::ComponentId;
use crate::state::{HoleState, HoleStates};
use crate::topology::{HoleId, STRIP_WIDTH, TopologyError, are_in_same_virtual_row};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Invalid placement geometry. Detected before a component is added.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("footprint anchored at hole {0} leaves the breadboard")]
    OffBoard(HoleId),
    #[error("hole {0} is already occupied")]
    Blocked(HoleId),
    #[error("hole {0} is shadowed by another component")]
    Shadowed(HoleId),
    #[error("pins do not line up in a single row")]
    NotInOneRow,
    #[error("hole {0} is on the power rails")]
    OnPowerRail(HoleId),
    #[error("resistor leads must be 4 to 10 holes apart, got {0}")]
    ResistorSpan(u16),
    #[error("resistor leads must be in the same row")]
    NotHorizontal,
    #[error("LED anode at hole {0} has no room for its cathode")]
    LedAtRowStart(HoleId),
    #[error("both ends are hole {0}")]
    SameHole(HoleId),
}

// ---------------------------------------------------------------------------
// Component variants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Breadboard,
    PowerSupply,
    Resistor,
    Ic,
    Led,
    SevenSegment,
}

impl ComponentKind {
    /// Prefix for generated names. ICs use their chip name instead.
    pub fn name_prefix(self) -> &'static str {
        match self {
            ComponentKind::Breadboard => "Breadboard",
            ComponentKind::PowerSupply => "PowerSupply",
            ComponentKind::Resistor => "Resistor",
            ComponentKind::Ic => "IC",
            ComponentKind::Led => "LED",
            ComponentKind::SevenSegment => "7LED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    Breadboard(Breadboard),
    PowerSupply(PowerSupply),
    Resistor(Resistor),
    Ic(Ic),
    Led(Led),
    SevenSegment(SevenSegment),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Breadboard(_) => ComponentKind::Breadboard,
            Component::PowerSupply(_) => ComponentKind::PowerSupply,
            Component::Resistor(_) => ComponentKind::Resistor,
            Component::Ic(_) => ComponentKind::Ic,
            Component::Led(_) => ComponentKind::Led,
            Component::SevenSegment(_) => ComponentKind::SevenSegment,
        }
    }

    /// Footprint access for parts mounted on a breadboard.
    pub fn placement(&self) -> Option<&dyn Placement> {
        match self {
            Component::Resistor(r) => Some(r),
            Component::Ic(ic) => Some(ic),
            Component::Led(led) => Some(led),
            Component::SevenSegment(seg) => Some(seg),
            Component::Breadboard(_) | Component::PowerSupply(_) => None,
        }
    }

    /// The breadboard this component is mounted on, if any.
    pub fn base(&self) -> Option<ComponentId> {
        self.placement().map(|p| p.base())
    }
}

// ---------------------------------------------------------------------------
// Placement capability
// ---------------------------------------------------------------------------

/// Footprint of a part mounted on a breadboard.
pub trait Placement {
    /// The breadboard carrying this part.
    fn base(&self) -> ComponentId;

    /// Occupied holes, indexed by pin number minus one.
    fn holes(&self) -> &[HoleId];

    fn hole_count(&self) -> usize {
        self.holes().len()
    }

    /// Hole under a 1-based pin.
    fn hole_id_at(&self, pin: usize) -> Option<HoleId> {
        pin.checked_sub(1).and_then(|i| self.holes().get(i).copied())
    }

    fn is_hole_occupied(&self, hole: HoleId) -> bool {
        self.holes().contains(&hole)
    }

    /// Holes made unusable by the body, pins included.
    fn shadowed_holes(&self) -> Vec<HoleId> {
        self.holes().to_vec()
    }
}

fn offset(anchor: HoleId, from: HoleId, delta: i32) -> Result<HoleId, PlacementError> {
    from.offset(delta)
        .map_err(|_: TopologyError| PlacementError::OffBoard(anchor))
}

// ---------------------------------------------------------------------------
// Breadboard
// ---------------------------------------------------------------------------

/// The 830-hole board. Its hole states are written by the simulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breadboard {
    #[serde(skip)]
    states: HoleStates,
}

impl Breadboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hole_state(&self, hole: HoleId) -> HoleState {
        self.states.get(hole)
    }

    pub fn hole_states(&self) -> &HoleStates {
        &self.states
    }

    pub(crate) fn set_hole_states(&mut self, states: HoleStates) {
        self.states = states;
    }
}

// ---------------------------------------------------------------------------
// Power supply
// ---------------------------------------------------------------------------

/// The three output terminals of a power supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplyTerminal {
    Vcc,
    Gnd,
    Clk,
}

impl SupplyTerminal {
    pub const ALL: [SupplyTerminal; 3] =
        [SupplyTerminal::Vcc, SupplyTerminal::Gnd, SupplyTerminal::Clk];

    /// Terminal number, 1..=3.
    pub fn number(self) -> u8 {
        match self {
            SupplyTerminal::Vcc => 1,
            SupplyTerminal::Gnd => 2,
            SupplyTerminal::Clk => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(SupplyTerminal::Vcc),
            2 => Some(SupplyTerminal::Gnd),
            3 => Some(SupplyTerminal::Clk),
            _ => None,
        }
    }
}

/// Bench supply with VCC, GND and a square-wave clock output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSupply {
    powered: bool,
    clock_enabled: bool,
    clock_high: bool,
    /// Clock frequency in Hz.
    frequency: Fixed64,
}

impl PowerSupply {
    pub fn new() -> Self {
        Self {
            powered: false,
            clock_enabled: false,
            clock_high: false,
            frequency: f64_to_fixed64(1.0),
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn is_clock_enabled(&self) -> bool {
        self.clock_enabled
    }

    pub fn is_clock_high(&self) -> bool {
        self.clock_high
    }

    pub fn frequency(&self) -> Fixed64 {
        self.frequency
    }

    pub fn set_powered(&mut self, on: bool) {
        self.powered = on;
        if !on {
            self.clock_high = false;
        }
    }

    pub fn toggle_power(&mut self) {
        self.set_powered(!self.powered);
    }

    pub fn set_clock_enabled(&mut self, on: bool) {
        self.clock_enabled = on;
        if !on {
            self.clock_high = false;
        }
    }

    pub fn set_frequency(&mut self, hz: Fixed64) {
        self.frequency = hz;
    }

    /// Flip the clock phase. Has no effect unless powered and clocked.
    pub fn trigger(&mut self) {
        if self.powered && self.clock_enabled {
            self.clock_high = !self.clock_high;
        }
    }

    pub fn output(&self, terminal: SupplyTerminal) -> HoleState {
        match terminal {
            SupplyTerminal::Vcc if self.powered => HoleState::High,
            SupplyTerminal::Gnd if self.powered => HoleState::Low,
            SupplyTerminal::Clk if self.powered && self.clock_enabled && self.clock_high => {
                HoleState::High
            }
            _ => HoleState::NoConnection,
        }
    }
}

impl Default for PowerSupply {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Resistor
// ---------------------------------------------------------------------------

/// Two-lead resistor. Conducts like a wire; the value is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resistor {
    base: ComponentId,
    holes: [HoleId; 2],
    /// Resistance in ohms.
    pub ohms: u32,
}

impl Resistor {
    pub const MIN_SPAN: u16 = 4;
    pub const MAX_SPAN: u16 = 10;

    pub fn new(
        base: ComponentId,
        source: HoleId,
        sink: HoleId,
        ohms: u32,
    ) -> Result<Self, PlacementError> {
        if source == sink {
            return Err(PlacementError::SameHole(source));
        }
        if !are_in_same_virtual_row(&[source, sink]) {
            return Err(PlacementError::NotHorizontal);
        }
        let span = source.get().abs_diff(sink.get());
        if !(Self::MIN_SPAN..=Self::MAX_SPAN).contains(&span) {
            return Err(PlacementError::ResistorSpan(span));
        }
        Ok(Self {
            base,
            holes: [source, sink],
            ohms,
        })
    }

    pub fn source(&self) -> HoleId {
        self.holes[0]
    }

    pub fn sink(&self) -> HoleId {
        self.holes[1]
    }
}

impl Placement for Resistor {
    fn base(&self) -> ComponentId {
        self.base
    }

    fn holes(&self) -> &[HoleId] {
        &self.holes
    }
}

// ---------------------------------------------------------------------------
// IC
// ---------------------------------------------------------------------------

/// A DIP package on the board, driven by an [`IcChip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ic {
    base: ComponentId,
    holes: Vec<HoleId>,
    shadow: Vec<HoleId>,
    chip: IcChip,
}

impl Ic {
    /// Lay out `chip` with pin 1 at `pin1`.
    ///
    /// Pins 1..=n/2 run left to right from `pin1`. Pins n/2+1..=n run right
    /// to left on the row above: one strip row up when the package straddles
    /// the bridge (pin 1 just below it), three rows up otherwise.
    pub fn new(base: ComponentId, pin1: HoleId, chip: IcChip) -> Result<Self, PlacementError> {
        let n = chip.pin_count();
        let half = n / 2;
        let straddles_bridge = pin1.is_on_bridge_border_bottom();
        let rise = (if straddles_bridge { STRIP_WIDTH } else { 3 * STRIP_WIDTH }) as i32;

        let mut holes = Vec::with_capacity(n);
        for i in 0..half {
            holes.push(offset(pin1, pin1, i as i32)?);
        }
        for i in 0..half {
            // Pin n - i sits above pin 1 + i.
            let j = (half - 1 - i) as i32;
            holes.push(offset(pin1, pin1, j - rise)?);
        }

        let mut shadow = holes.clone();
        if !straddles_bridge {
            let top_left = holes[n - 1];
            for row in 1..=2 {
                for i in 0..half {
                    shadow.push(offset(pin1, top_left, row * STRIP_WIDTH as i32 + i as i32)?);
                }
            }
        }

        if !are_in_same_virtual_row(&holes[..half]) || !are_in_same_virtual_row(&holes[half..]) {
            return Err(PlacementError::NotInOneRow);
        }
        for hole in [holes[0], holes[n - 1]] {
            if hole.is_in_power_rail() {
                return Err(PlacementError::OnPowerRail(hole));
            }
        }

        Ok(Self {
            base,
            holes,
            shadow,
            chip,
        })
    }

    pub fn chip(&self) -> &IcChip {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut IcChip {
        &mut self.chip
    }

    pub fn pin1(&self) -> HoleId {
        self.holes[0]
    }

    /// Holes under output pins.
    pub fn output_holes(&self) -> Vec<HoleId> {
        self.pins_with(PinDirection::Output)
    }

    /// Holes under input pins.
    pub fn input_holes(&self) -> Vec<HoleId> {
        self.pins_with(PinDirection::Input)
    }

    fn pins_with(&self, direction: PinDirection) -> Vec<HoleId> {
        self.chip
            .datasheet()
            .pins
            .iter()
            .zip(&self.holes)
            .filter(|(d, _)| **d == direction)
            .map(|(_, h)| *h)
            .collect()
    }
}

impl Placement for Ic {
    fn base(&self) -> ComponentId {
        self.base
    }

    fn holes(&self) -> &[HoleId] {
        &self.holes
    }

    fn shadowed_holes(&self) -> Vec<HoleId> {
        self.shadow.clone()
    }
}

// ---------------------------------------------------------------------------
// LED
// ---------------------------------------------------------------------------

/// Single LED with the cathode one hole left of the anode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Led {
    base: ComponentId,
    holes: [HoleId; 2],
    #[serde(skip)]
    lit: bool,
}

impl Led {
    pub fn new(base: ComponentId, anode: HoleId) -> Result<Self, PlacementError> {
        let cathode = anode
            .offset(-1)
            .map_err(|_| PlacementError::LedAtRowStart(anode))?;
        if cathode.virtual_row() != anode.virtual_row() {
            return Err(PlacementError::LedAtRowStart(anode));
        }
        Ok(Self {
            base,
            holes: [anode, cathode],
            lit: false,
        })
    }

    pub fn anode(&self) -> HoleId {
        self.holes[0]
    }

    pub fn cathode(&self) -> HoleId {
        self.holes[1]
    }

    pub fn is_on(&self) -> bool {
        self.lit
    }

    /// Light iff anode HIGH and cathode LOW.
    pub fn update(&mut self, states: &HoleStates) {
        self.lit = states.get(self.anode()).is_high() && states.get(self.cathode()).is_low();
    }

    pub(crate) fn turn_off(&mut self) {
        self.lit = false;
    }
}

impl Placement for Led {
    fn base(&self) -> ComponentId {
        self.base
    }

    fn holes(&self) -> &[HoleId] {
        &self.holes
    }
}

// ---------------------------------------------------------------------------
// Seven-segment display
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    Dp,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::A,
        Segment::B,
        Segment::C,
        Segment::D,
        Segment::E,
        Segment::F,
        Segment::G,
        Segment::Dp,
    ];

    /// Package pin driving this segment.
    pub fn pin(self) -> usize {
        match self {
            Segment::A => 7,
            Segment::B => 6,
            Segment::C => 4,
            Segment::D => 2,
            Segment::E => 1,
            Segment::F => 9,
            Segment::G => 10,
            Segment::Dp => 5,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Ten-pin display: pins 10..=6 along the top row, pins 1..=5 along the
/// bottom row, commons on pins 3 and 8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SevenSegment {
    base: ComponentId,
    holes: Vec<HoleId>,
    shadow: Vec<HoleId>,
    common_cathode: bool,
    #[serde(skip)]
    lit: [bool; 8],
}

impl SevenSegment {
    pub const PIN_COUNT: usize = 10;
    const COMMON_PINS: [usize; 2] = [3, 8];
    /// Strip rows between the two pin rows, counting the bridge as two.
    const HEIGHT: u32 = 7;

    /// Lay out the display with pin 10 at `top_left`.
    pub fn new(
        base: ComponentId,
        top_left: HoleId,
        common_cathode: bool,
    ) -> Result<Self, PlacementError> {
        if top_left.is_in_power_rail() {
            return Err(PlacementError::OnPowerRail(top_left));
        }

        let mut rows = vec![top_left];
        let mut x = top_left;
        let mut step = 1;
        while step <= Self::HEIGHT {
            if x.is_on_bridge_border_top() {
                step += 2;
            }
            x = offset(top_left, x, STRIP_WIDTH as i32)?;
            rows.push(x);
            step += 1;
        }
        let bottom_left = x;

        let mut holes = vec![top_left; Self::PIN_COUNT];
        for i in 0..5 {
            holes[i] = offset(top_left, bottom_left, i as i32)?;
            holes[Self::PIN_COUNT - 1 - i] = offset(top_left, top_left, i as i32)?;
        }

        let mut shadow = Vec::with_capacity(rows.len() * 5);
        for row_start in rows {
            for i in 0..5 {
                shadow.push(offset(top_left, row_start, i)?);
            }
        }

        if !are_in_same_virtual_row(&holes[..5]) || !are_in_same_virtual_row(&holes[5..]) {
            return Err(PlacementError::NotInOneRow);
        }
        if holes[0].is_in_power_rail() {
            return Err(PlacementError::OnPowerRail(holes[0]));
        }

        Ok(Self {
            base,
            holes,
            shadow,
            common_cathode,
            lit: [false; 8],
        })
    }

    pub fn is_common_cathode(&self) -> bool {
        self.common_cathode
    }

    pub fn segment_hole(&self, segment: Segment) -> HoleId {
        self.holes[segment.pin() - 1]
    }

    pub fn common_holes(&self) -> [HoleId; 2] {
        Self::COMMON_PINS.map(|pin| self.holes[pin - 1])
    }

    pub fn is_on(&self, segment: Segment) -> bool {
        self.lit[segment.index()]
    }

    pub fn lit_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        Segment::ALL.into_iter().filter(|s| self.is_on(*s))
    }

    /// Recompute every segment. Segments only light when both commons sit
    /// at the active level (LOW for common cathode, HIGH for common anode).
    pub fn update(&mut self, states: &HoleStates) {
        let (common, active) = if self.common_cathode {
            (HoleState::Low, HoleState::High)
        } else {
            (HoleState::High, HoleState::Low)
        };
        let enabled = self.common_holes().iter().all(|h| states.get(*h) == common);
        for segment in Segment::ALL {
            self.lit[segment.index()] = enabled && states.get(self.segment_hole(segment)) == active;
        }
    }

    pub(crate) fn turn_off(&mut self) {
        self.lit = [false; 8];
    }
}

impl Placement for SevenSegment {
    fn base(&self) -> ComponentId {
        self.base
    }

    fn holes(&self) -> &[HoleId] {
        &self.holes
    }

    fn shadowed_holes(&self) -> Vec<HoleId> {
        self.shadow.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{and_gate_datasheet, hole};
    use slotmap::SlotMap;

    fn board() -> ComponentId {
        let mut ids: SlotMap<ComponentId, ()> = SlotMap::with_key();
        ids.insert(())
    }

    fn chip() -> IcChip {
        IcChip::new(and_gate_datasheet()).unwrap()
    }

    // -----------------------------------------------------------------------
    // Power supply
    // -----------------------------------------------------------------------

    #[test]
    fn supply_outputs_follow_power_and_clock() {
        let mut ps = PowerSupply::new();
        assert_eq!(ps.output(SupplyTerminal::Vcc), HoleState::NoConnection);
        assert_eq!(ps.output(SupplyTerminal::Gnd), HoleState::NoConnection);

        ps.set_powered(true);
        assert_eq!(ps.output(SupplyTerminal::Vcc), HoleState::High);
        assert_eq!(ps.output(SupplyTerminal::Gnd), HoleState::Low);
        assert_eq!(ps.output(SupplyTerminal::Clk), HoleState::NoConnection);

        ps.set_clock_enabled(true);
        ps.trigger();
        assert_eq!(ps.output(SupplyTerminal::Clk), HoleState::High);
        ps.trigger();
        assert_eq!(ps.output(SupplyTerminal::Clk), HoleState::NoConnection);
    }

    #[test]
    fn trigger_is_ignored_without_power() {
        let mut ps = PowerSupply::new();
        ps.set_clock_enabled(true);
        ps.trigger();
        assert!(!ps.is_clock_high());
    }

    #[test]
    fn power_off_resets_clock_phase() {
        let mut ps = PowerSupply::new();
        ps.set_powered(true);
        ps.set_clock_enabled(true);
        ps.trigger();
        ps.toggle_power();
        assert!(!ps.is_powered());
        assert!(!ps.is_clock_high());
    }

    #[test]
    fn terminal_numbers_round_trip() {
        for t in SupplyTerminal::ALL {
            assert_eq!(SupplyTerminal::from_number(t.number()), Some(t));
        }
        assert_eq!(SupplyTerminal::from_number(4), None);
    }

    // -----------------------------------------------------------------------
    // Resistor
    // -----------------------------------------------------------------------

    #[test]
    fn resistor_span_limits() {
        let b = board();
        assert!(Resistor::new(b, hole(300), hole(304), 220).is_ok());
        assert!(Resistor::new(b, hole(310), hole(300), 220).is_ok());
        assert_eq!(
            Resistor::new(b, hole(300), hole(303), 220),
            Err(PlacementError::ResistorSpan(3))
        );
        assert_eq!(
            Resistor::new(b, hole(300), hole(311), 220),
            Err(PlacementError::ResistorSpan(11))
        );
    }

    #[test]
    fn resistor_must_be_horizontal() {
        let b = board();
        // 260 and 265 straddle the end of strip row 1.
        assert_eq!(
            Resistor::new(b, hole(260), hole(265), 1000),
            Err(PlacementError::NotHorizontal)
        );
        // The rails are fine.
        assert!(Resistor::new(b, hole(10), hole(20), 1000).is_ok());
    }

    // -----------------------------------------------------------------------
    // IC layout
    // -----------------------------------------------------------------------

    #[test]
    fn ic_straddling_bridge_layout() {
        let ic = Ic::new(board(), hole(520), chip()).unwrap();
        let raw: Vec<u16> = ic.holes().iter().map(|h| h.get()).collect();
        // Pins 1..=7 below the bridge, pins 8..=14 directly above.
        assert_eq!(raw[..7], [520, 521, 522, 523, 524, 525, 526]);
        assert_eq!(raw[7..], [463, 462, 461, 460, 459, 458, 457]);
        assert_eq!(ic.hole_id_at(14), Some(hole(457)));
        assert_eq!(ic.hole_id_at(0), None);
        assert_eq!(ic.shadowed_holes().len(), 14);
    }

    #[test]
    fn ic_inside_one_bank_shadows_two_rows() {
        let ic = Ic::new(board(), hole(400), chip()).unwrap();
        assert_eq!(ic.hole_id_at(14), Some(hole(211)));
        let shadow = ic.shadowed_holes();
        assert_eq!(shadow.len(), 14 + 2 * 7);
        assert!(shadow.contains(&hole(274)));
        assert!(shadow.contains(&hole(337)));
        assert!(!ic.is_hole_occupied(hole(274)));
    }

    #[test]
    fn ic_pins_must_stay_in_one_row() {
        // Pins 5..=7 would wrap into the next strip row.
        assert_eq!(
            Ic::new(board(), hole(575), chip()).unwrap_err(),
            PlacementError::NotInOneRow
        );
    }

    #[test]
    fn ic_off_board_is_rejected() {
        assert!(matches!(
            Ic::new(board(), hole(828), chip()),
            Err(PlacementError::OffBoard(_))
        ));
    }

    #[test]
    fn ic_top_row_on_rails_is_rejected() {
        assert_eq!(
            Ic::new(board(), hole(210), chip()).unwrap_err(),
            PlacementError::OnPowerRail(hole(21))
        );
    }

    #[test]
    fn ic_pin_directions_split_holes() {
        let ic = Ic::new(board(), hole(520), chip()).unwrap();
        // 7408: outputs on 3, 6, 8, 11.
        let outputs = ic.output_holes();
        assert_eq!(outputs, vec![hole(522), hole(525), hole(463), hole(460)]);
        assert_eq!(ic.input_holes().len(), 10);
    }

    // -----------------------------------------------------------------------
    // LED
    // -----------------------------------------------------------------------

    #[test]
    fn led_cathode_is_left_of_anode() {
        let led = Led::new(board(), hole(300)).unwrap();
        assert_eq!(led.cathode(), hole(299));
    }

    #[test]
    fn led_rejects_row_start() {
        for raw in [1u16, 51, 101, 151, 201, 264, 768] {
            assert_eq!(
                Led::new(board(), hole(raw)).unwrap_err(),
                PlacementError::LedAtRowStart(hole(raw))
            );
        }
        assert!(Led::new(board(), hole(2)).is_ok());
    }

    #[test]
    fn led_lights_only_forward_biased() {
        use crate::state::HoleState::*;
        let mut led = Led::new(board(), hole(300)).unwrap();
        for (anode, cathode, expected) in [
            (High, Low, true),
            (High, High, false),
            (Low, Low, false),
            (Low, High, false),
            (High, NoConnection, false),
            (NoConnection, Low, false),
        ] {
            let mut states = HoleStates::new();
            states.set(hole(300), anode);
            states.set(hole(299), cathode);
            led.update(&states);
            assert_eq!(led.is_on(), expected, "{anode:?}/{cathode:?}");
        }
    }

    // -----------------------------------------------------------------------
    // Seven-segment display
    // -----------------------------------------------------------------------

    #[test]
    fn seven_segment_straddles_bridge() {
        let seg = SevenSegment::new(board(), hole(201), true).unwrap();
        let raw: Vec<u16> = seg.holes().iter().map(|h| h.get()).collect();
        // Pins 1..=5 land on the first row below the bridge.
        assert_eq!(raw[..5], [516, 517, 518, 519, 520]);
        assert_eq!(raw[5..], [205, 204, 203, 202, 201]);
        assert_eq!(seg.shadowed_holes().len(), 30);
        assert_eq!(seg.common_holes(), [hole(518), hole(203)]);
    }

    #[test]
    fn seven_segment_rejects_rails_and_overflow() {
        assert_eq!(
            SevenSegment::new(board(), hole(10), true).unwrap_err(),
            PlacementError::OnPowerRail(hole(10))
        );
        assert!(matches!(
            SevenSegment::new(board(), hole(600), true),
            Err(PlacementError::OffBoard(_))
        ));
        assert_eq!(
            SevenSegment::new(board(), hole(261), true).unwrap_err(),
            PlacementError::NotInOneRow
        );
    }

    #[test]
    fn common_cathode_segments() {
        let mut seg = SevenSegment::new(board(), hole(201), true).unwrap();
        let mut states = HoleStates::new();
        for h in seg.common_holes() {
            states.set(h, HoleState::Low);
        }
        states.set(seg.segment_hole(Segment::A), HoleState::High);
        states.set(seg.segment_hole(Segment::Dp), HoleState::High);
        seg.update(&states);
        assert_eq!(seg.lit_segments().collect::<Vec<_>>(), vec![Segment::A, Segment::Dp]);

        // Commons not both LOW: everything dark.
        states.set(seg.common_holes()[0], HoleState::NoConnection);
        seg.update(&states);
        assert_eq!(seg.lit_segments().count(), 0);
    }

    #[test]
    fn common_anode_segments() {
        let mut seg = SevenSegment::new(board(), hole(201), false).unwrap();
        let mut states = HoleStates::new();
        for h in seg.common_holes() {
            states.set(h, HoleState::High);
        }
        states.set(seg.segment_hole(Segment::G), HoleState::Low);
        seg.update(&states);
        assert!(seg.is_on(Segment::G));
        assert!(!seg.is_on(Segment::A));
    }

    #[test]
    fn component_kind_and_base() {
        let b = board();
        let led = Component::Led(Led::new(b, hole(300)).unwrap());
        assert_eq!(led.kind(), ComponentKind::Led);
        assert_eq!(led.base(), Some(b));
        assert_eq!(Component::Breadboard(Breadboard::new()).base(), None);
        assert_eq!(ComponentKind::SevenSegment.name_prefix(), "7LED");
    }
}
