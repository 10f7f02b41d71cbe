//! Breadboard Core -- the logic-level simulation engine for virtual
//! breadboard circuits.
//!
//! A [`circuit::Circuit`] holds breadboards, bench power supplies, and the
//! parts mounted on them (resistors, 74xx-style ICs, LEDs and seven-segment
//! displays), plus the wires between holes and supply terminals. The engine
//! computes a three-valued [`state::HoleState`] for every one of the 830
//! holes of the powered board.
//!
//! # Simulation Pass
//!
//! Each call to [`sim::Simulator::simulate`] runs bounded outer passes:
//!
//! 1. **Resolve** -- Build the connectivity matrices and IC dependency order
//!    (cached until the circuit revision changes).
//! 2. **Seed** -- Flood each supply terminal's level through its wiring.
//! 3. **Evaluate** -- Run every IC's condition tables in dependency order
//!    and flood the driven outputs, repeating until a round settles.
//! 4. **Publish** -- Store hole states on the board and refresh LEDs and
//!    seven-segment displays.
//!
//! Feedback circuits are not an error: they stop at the iteration bound and
//! report [`sim::SimOutcome::Oscillating`].
//!
//! # Key Types
//!
//! - [`topology::HoleId`] -- Validated hole number with the board geometry.
//! - [`circuit::Circuit`] -- The editable document and its placement rules.
//! - [`ic::Datasheet`] -- Structured chip description with condition tables.
//! - [`connectivity::Connectivity`] -- Row, column and hole matrices.
//! - [`sim::Simulator`] -- Pass driver with its topology cache.
//! - [`clock::ClockDriver`] -- Fires simulation passes on clock edges.
//! - [`serialize`] -- Versioned binary snapshots via bitcode.

pub mod bitmatrix;
pub mod circuit;
pub mod clock;
pub mod component;
pub mod connectivity;
pub mod dependency;
pub mod fixed;
pub mod ic;
pub mod id;
pub mod propagate;
pub mod serialize;
pub mod sim;
pub mod state;
pub mod topology;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
