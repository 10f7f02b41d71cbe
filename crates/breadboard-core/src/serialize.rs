//! Binary snapshots of a circuit document.
//!
//! A snapshot is the `bitcode` encoding of a versioned header followed by
//! the [`Circuit`]. Component and wire ids survive the round trip. Hole
//! states and display flags are derived data and are not stored; the next
//! simulation recomputes them. IC memory is stored, so sequential chips
//! keep their contents.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a circuit snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xB8EA_D001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Circuit revision at the time the snapshot was taken.
    pub revision: u64,
}

impl SnapshotHeader {
    pub fn new(revision: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            revision,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    header: SnapshotHeader,
    circuit: &'a Circuit,
}

#[derive(Deserialize)]
struct Snapshot {
    header: SnapshotHeader,
    circuit: Circuit,
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

pub fn save_circuit(circuit: &Circuit) -> Result<Vec<u8>, SerializeError> {
    let snapshot = SnapshotRef {
        header: SnapshotHeader::new(circuit.revision()),
        circuit,
    };
    bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
}

pub fn load_circuit(data: &[u8]) -> Result<Circuit, DeserializeError> {
    let snapshot: Snapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    snapshot.header.validate()?;
    Ok(snapshot.circuit)
}

/// Decode a snapshot and return only its header.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let snapshot: Snapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}
