//! Datasheet and configuration loading for the breadboard simulator.
//!
//! Chips are described in RON, TOML or JSON files and resolved into
//! validated [`breadboard_core::ic::Datasheet`]s. A small 74xx catalog is
//! bundled with the crate.

pub mod catalog;
pub mod loader;
pub mod schema;

pub use catalog::IcCatalog;
pub use loader::{BreadboardData, DataLoadError, load_breadboard_data, load_sim_config};
