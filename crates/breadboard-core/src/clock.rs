//! Real-time driver for a power supply's clock output.
//!
//! The host feeds wall-clock time into [`ClockDriver::advance`]. Every time a
//! half period has accumulated, the supply's clock phase flips and one
//! simulation runs, so each edge of the square wave is observed by the
//! circuit. Time is kept in fixed point to make tick counts reproducible.

use crate::circuit::{Circuit, CircuitError};
use crate::fixed::{Fixed64, checked_div_64, f64_to_fixed64};
use crate::id::ComponentId;
use crate::sim::{SimReport, Simulator};

/// Fraction of each period the clock spends high.
pub const DUTY_CYCLE: f64 = 0.5;

/// Seconds between clock edges at `hz`, or `None` for a non-positive or
/// unrepresentable frequency.
pub fn half_period(hz: Fixed64) -> Option<Fixed64> {
    if hz <= Fixed64::ZERO {
        return None;
    }
    checked_div_64(f64_to_fixed64(DUTY_CYCLE), hz).filter(|p| *p > Fixed64::ZERO)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockDriver {
    supply: ComponentId,
    accumulator: Fixed64,
}

impl ClockDriver {
    pub fn new(supply: ComponentId) -> Self {
        Self {
            supply,
            accumulator: Fixed64::ZERO,
        }
    }

    pub fn supply(&self) -> ComponentId {
        self.supply
    }

    /// Time accumulated toward the next edge.
    pub fn pending(&self) -> Fixed64 {
        self.accumulator
    }

    /// Advance by `elapsed` seconds, running one simulation per clock edge.
    ///
    /// Returns the report of every simulation run, oldest first. While the
    /// supply is off, its clock is disabled, or its frequency is not
    /// positive, no edges fire and accumulated time is discarded.
    pub fn advance(
        &mut self,
        circuit: &mut Circuit,
        simulator: &mut Simulator,
        elapsed: Fixed64,
    ) -> Result<Vec<SimReport>, CircuitError> {
        let supply = circuit.power_supply(self.supply)?;
        let half = match half_period(supply.frequency()) {
            Some(half) if supply.is_powered() && supply.is_clock_enabled() => half,
            _ => {
                self.accumulator = Fixed64::ZERO;
                return Ok(Vec::new());
            }
        };

        self.accumulator = self.accumulator.saturating_add(elapsed.max(Fixed64::ZERO));
        let mut reports = Vec::new();
        while self.accumulator >= half {
            self.accumulator -= half;
            circuit.power_supply_mut(self.supply)?.trigger();
            reports.push(simulator.simulate(circuit));
        }
        if !reports.is_empty() {
            log::trace!("clock {:?} fired {} edges", self.supply, reports.len());
        }
        Ok(reports)
    }
}
